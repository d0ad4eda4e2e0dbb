//! Error types for the mirror engine.
//!
//! Errors come in two tiers:
//!
//! - [`MirrorError`] is fatal for one mirror entry and unwinds out of
//!   [`MirrorEngine::run`](super::MirrorEngine::run).
//! - [`ArtifactError`] is recoverable; it is recorded against a single
//!   artifact and never crosses the worker boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::summary::RunSummary;
use crate::manifest::DecodeError;
use crate::transport::{SourceError, TransferError};

/// Result type for engine operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that abort a mirror entry.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A required mirror entry field is missing or empty.
    #[error("mirror missing '{0}' field")]
    MissingField(&'static str),

    /// The source location cannot be mirrored from.
    #[error("invalid source: {0}")]
    InvalidSource(#[from] SourceError),

    /// The destination directory does not exist.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The destination (or its `gems` directory) is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Failed to create or inspect a local directory.
    #[error("failed to prepare {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transport could not be initialized.
    #[error("transport initialization failed: {0}")]
    Transport(#[source] TransferError),

    /// The manifest blob could not be retrieved.
    #[error("failed to fetch manifest: {0}")]
    Fetch(#[source] TransferError),

    /// The manifest blob is not valid zlib data.
    #[error("manifest {url} is not validly compressed: {source}")]
    Decompression {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The local manifest snapshot could not be written.
    #[error("failed to write manifest snapshot: {0}")]
    Snapshot(#[source] PersistError),

    /// The manifest could not be decoded.
    #[error("failed to decode manifest {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// The run was interrupted; the summary covers completed work.
    #[error("mirror run interrupted after {} of {} downloads", .0.completed, .0.planned)]
    Interrupted(Box<RunSummary>),
}

impl MirrorError {
    /// Whether the error was detected before any network or file I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidSource(_)
                | Self::DirectoryNotFound(_)
                | Self::NotADirectory(_)
        )
    }

    /// Whether the run was interrupted rather than failed.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

/// Errors raised by the atomic writer.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading the incoming byte stream failed.
    #[error("read error: {0}")]
    Read(#[source] io::Error),

    /// Writing, flushing or promoting the file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pre-write hook refused the write.
    #[error("write of {} rejected: {reason}", path.display())]
    Rejected { path: PathBuf, reason: String },
}

/// Errors that fail a single artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The remote transfer failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The artifact could not be persisted.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl ArtifactError {
    /// Whether a retry under a different remote name could help.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer(_))
    }
}
