//! Source locations and the transports that read from them.
//!
//! A mirror source is either an HTTP(S) base URL or a local directory
//! (given as a bare path or a `file://` URL). Both are read through the
//! [`Transport`] trait so the mirror engine never cares which one it has,
//! and tests can substitute an in-memory implementation.
//!
//! # Architecture
//!
//! ```text
//! Source::parse("https://gems.example.com")  ──►  HttpTransport (reqwest blocking)
//! Source::parse("file:///srv/gems")          ──►  FileTransport (std::fs)
//! Source::parse("/srv/gems")                 ──►  FileTransport
//! ```

mod file;
mod http;
mod source;

pub use file::FileTransport;
pub use http::{HttpTransport, DEFAULT_TIMEOUT_SECS};
pub use source::{Source, SourceError};

use std::io::{self, Read};
use std::path::PathBuf;

use thiserror::Error;

/// Byte stream returned by a transport.
pub type ByteStream = Box<dyn Read + Send>;

/// Errors raised while retrieving a remote resource.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The request exceeded the per-request deadline.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// A local source file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The byte stream failed part way through.
    #[error("failed reading {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The transport could not be initialized.
    #[error("failed to initialize transport: {0}")]
    Init(String),
}

/// A blocking reader of remote resources.
///
/// Implementations are shared across worker threads.
pub trait Transport: Send + Sync {
    /// Perform one-time initialization before concurrent use.
    ///
    /// Called once by the engine on the producer thread before any worker
    /// starts. Calling it again must be harmless.
    fn prepare(&self) -> Result<(), TransferError> {
        Ok(())
    }

    /// Open the resource at `location` for reading.
    ///
    /// `location` is a full URL or path as produced by [`Source::locate`].
    fn open(&self, location: &str) -> Result<ByteStream, TransferError>;
}
