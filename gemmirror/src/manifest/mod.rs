//! Manifest records and the decoders for supported index formats.
//!
//! A manifest is the remote repository's inventory: one [`ManifestRecord`]
//! per published artifact, keyed by its full name (`name-version` or
//! `name-version-platform`). The engine only depends on the
//! [`ManifestDecoder`] trait; the concrete format is chosen by configuration.
//!
//! # Formats
//!
//! | Format | Manifest name | Content |
//! |--------|---------------|---------|
//! | [`ManifestFormat::Line`] | `index` | one full name per line, then optional metadata |
//! | [`ManifestFormat::Json`] | `index.json` | JSON array of names or objects |
//!
//! The remote copy is always zlib-compressed and published as
//! `<manifest name>.Z`.

mod json;
mod line;

pub use json::JsonDecoder;
pub use line::LineDecoder;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// One artifact published by the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Unique key: package name plus version (and platform, if any).
    pub full_name: String,
    /// Format-specific data carried along untouched.
    pub metadata: Option<String>,
}

impl ManifestRecord {
    /// Create a record with no metadata.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            metadata: None,
        }
    }

    /// Attach opaque metadata to the record.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

/// Errors raised while decoding a manifest.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The manifest is not UTF-8 text.
    #[error("manifest is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The manifest is not valid JSON.
    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry could not be turned into a record.
    #[error("invalid manifest entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

/// Decodes inflated manifest bytes into records.
pub trait ManifestDecoder: Send + Sync {
    /// Name of the manifest file, without the `.Z` suffix.
    ///
    /// The remote blob is `<name>.Z`; the local snapshot is `<name>`.
    fn manifest_name(&self) -> &str;

    /// Decode the inflated manifest into records, in manifest order.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<ManifestRecord>, DecodeError>;
}

/// Supported manifest formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    /// Plain text, one record per line.
    #[default]
    Line,
    /// JSON array.
    Json,
}

impl ManifestFormat {
    /// Create the decoder for this format.
    pub fn decoder(self) -> Arc<dyn ManifestDecoder> {
        match self {
            ManifestFormat::Line => Arc::new(LineDecoder),
            ManifestFormat::Json => Arc::new(JsonDecoder),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestFormat::Line => write!(f, "line"),
            ManifestFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ManifestFormat::Line),
            "json" => Ok(ManifestFormat::Json),
            other => Err(format!("unknown manifest format '{}'", other)),
        }
    }
}

/// Check that a full name can safely become a file name.
///
/// Names come from the remote side and end up as paths under the local
/// `gems` directory and in source URLs. Separators, dot-segments, whitespace
/// and characters with a meaning in URLs (`#`, `?`, `%`) are rejected.
pub(crate) fn validate_full_name(index: usize, name: &str) -> Result<(), DecodeError> {
    let reason = if name.is_empty() {
        Some("empty name")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative path segment")
    } else if name.chars().any(char::is_control) {
        Some("name contains control characters")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if name.contains(['#', '?', '%']) {
        Some("name contains a URL delimiter")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DecodeError::InvalidEntry {
            index,
            reason: format!("{} ({:?})", reason, name),
        }),
        None => Ok(()),
    }
}

/// Drop records whose full name was already seen, keeping the first.
pub(crate) fn dedupe(records: Vec<ManifestRecord>) -> Vec<ManifestRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.full_name.clone()))
        .collect()
}
