//! Parsing of configured source locations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{FileTransport, HttpTransport, Transport};

/// Errors raised for source locations that cannot be mirrored from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The location is empty.
    #[error("source location is empty")]
    Empty,

    /// The location uses a scheme with no transport.
    #[error("unsupported source scheme '{scheme}' in {location}")]
    UnsupportedScheme { scheme: String, location: String },
}

/// Where a mirror reads its manifest and artifacts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An `http://` or `https://` base URL, without a trailing slash.
    Http(String),
    /// A local directory.
    Local(PathBuf),
}

impl Source {
    /// Parse a configured source location.
    ///
    /// `file://` URLs are converted to local paths, including the
    /// `file:///C:/...` drive-letter form. Locations without a scheme are
    /// local paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use gemmirror::transport::Source;
    ///
    /// assert_eq!(
    ///     Source::parse("https://gems.example.com/").unwrap(),
    ///     Source::Http("https://gems.example.com".to_string())
    /// );
    /// assert_eq!(
    ///     Source::parse("file:///srv/gems").unwrap(),
    ///     Source::Local(PathBuf::from("/srv/gems"))
    /// );
    /// ```
    pub fn parse(location: &str) -> Result<Self, SourceError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(SourceError::Empty);
        }

        let Some(scheme) = scheme_of(location) else {
            return Ok(Source::Local(PathBuf::from(location)));
        };

        match scheme.to_ascii_lowercase().as_str() {
            "http" | "https" => Ok(Source::Http(location.trim_end_matches('/').to_string())),
            "file" => Ok(Source::Local(file_url_path(&location[scheme.len() + 1..]))),
            _ => Err(SourceError::UnsupportedScheme {
                scheme: scheme.to_string(),
                location: location.to_string(),
            }),
        }
    }

    /// Join a relative path onto the source base.
    pub fn locate(&self, relative: &str) -> String {
        match self {
            Source::Http(base) => format!("{}/{}", base, relative.trim_start_matches('/')),
            Source::Local(base) => base.join(relative).to_string_lossy().into_owned(),
        }
    }

    /// Location of the compressed manifest for a manifest name.
    pub fn manifest_location(&self, manifest_name: &str) -> String {
        self.locate(&format!("{}.Z", manifest_name))
    }

    /// Location of an artifact file under the source's `gems` directory.
    pub fn artifact_location(&self, filename: &str) -> String {
        self.locate(&format!("gems/{}", filename))
    }

    /// Create the transport that reads from this source.
    pub fn transport(&self, timeout: Duration) -> Arc<dyn Transport> {
        match self {
            Source::Http(_) => Arc::new(HttpTransport::with_timeout(timeout)),
            Source::Local(_) => Arc::new(FileTransport::new()),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Http(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Return the URL scheme of `location`, if it has one.
///
/// Single-letter schemes are Windows drive letters, not schemes.
fn scheme_of(location: &str) -> Option<&str> {
    let (scheme, _) = location.split_once(':')?;
    let valid = scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Convert the part of a `file:` URL after the colon into a path.
fn file_url_path(rest: &str) -> PathBuf {
    let path = match rest.strip_prefix("//") {
        // Empty authority: file:///srv/gems
        Some(after) if after.starts_with('/') => after,
        Some(after) => match after.strip_prefix("localhost") {
            Some(path) => path,
            None => after,
        },
        None => rest,
    };

    // file:///C:/gems -> C:/gems
    if has_drive_letter(path) {
        return Path::new(&path[1..]).to_path_buf();
    }
    PathBuf::from(path)
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':'
}
