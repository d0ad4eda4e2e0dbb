//! Filesystem transport for `file://` and bare-path sources.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{ByteStream, TransferError, Transport};

/// Reads source resources straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl FileTransport {
    /// Create a new filesystem transport.
    pub fn new() -> Self {
        Self
    }
}

impl Transport for FileTransport {
    fn open(&self, location: &str) -> Result<ByteStream, TransferError> {
        let path = Path::new(location);
        let file = File::open(path).map_err(|e| TransferError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}
