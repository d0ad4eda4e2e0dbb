//! Mirror entries and cancellation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::{MirrorError, MirrorResult};
use crate::transport::Source;

/// One configured `(source, destination)` pair to synchronize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    /// Source location: an HTTP(S) URL, a `file://` URL or a local path.
    pub from: String,
    /// Destination directory. Must already exist.
    pub to: PathBuf,
}

impl MirrorEntry {
    /// Create a mirror entry.
    pub fn new(from: impl Into<String>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Check the entry's fields and parse its source.
    ///
    /// Performs no I/O.
    pub fn source(&self) -> MirrorResult<Source> {
        if self.from.trim().is_empty() {
            return Err(MirrorError::MissingField("from"));
        }
        if self.to.as_os_str().is_empty() {
            return Err(MirrorError::MissingField("to"));
        }
        Ok(Source::parse(&self.from)?)
    }
}

/// Shared flag used to interrupt a run.
///
/// Cloning yields a handle to the same flag, so a signal handler can hold
/// one clone while the engine checks another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_source() {
        let entry = MirrorEntry::new("https://gems.example.com", "/srv/mirror");
        assert_eq!(
            entry.source().unwrap(),
            Source::Http("https://gems.example.com".to_string())
        );
    }

    #[test]
    fn test_entry_missing_fields() {
        let entry = MirrorEntry::new("", "/srv/mirror");
        assert!(matches!(
            entry.source(),
            Err(MirrorError::MissingField("from"))
        ));

        let entry = MirrorEntry::new("https://gems.example.com", "");
        assert!(matches!(entry.source(), Err(MirrorError::MissingField("to"))));
    }

    #[test]
    fn test_entry_invalid_source() {
        let entry = MirrorEntry::new("gopher://gems.example.com", "/srv/mirror");
        let err = entry.source().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let handle = token.clone();

        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
