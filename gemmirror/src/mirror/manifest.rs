//! Manifest acquisition: fetch, inflate and snapshot.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;

use super::error::{MirrorError, MirrorResult};
use super::writer::AtomicWriter;
use crate::transport::{Source, TransferError, Transport};

/// Retrieves the compressed manifest and keeps a local snapshot of it.
pub struct ManifestFetcher<'a> {
    source: &'a Source,
    transport: &'a dyn Transport,
}

impl<'a> ManifestFetcher<'a> {
    /// Create a fetcher for `source`.
    pub fn new(source: &'a Source, transport: &'a dyn Transport) -> Self {
        Self { source, transport }
    }

    /// Fetch `<source>/<manifest_name>.Z`, inflate it and write the result
    /// to `<destination>/<manifest_name>`.
    ///
    /// The snapshot is written before the bytes are returned, so it exists
    /// even if decoding fails later.
    pub fn fetch(&self, manifest_name: &str, destination: &Path) -> MirrorResult<Vec<u8>> {
        let url = self.source.manifest_location(manifest_name);
        tracing::info!(url = %url, "Fetching manifest");

        let mut stream = self.transport.open(&url).map_err(MirrorError::Fetch)?;
        let mut compressed = Vec::new();
        stream
            .read_to_end(&mut compressed)
            .map_err(|source| {
                MirrorError::Fetch(TransferError::Read {
                    url: url.clone(),
                    source,
                })
            })?;

        let bytes = inflate(&compressed).map_err(|source| MirrorError::Decompression {
            url: url.clone(),
            source,
        })?;

        let snapshot = snapshot_path(destination, manifest_name);
        AtomicWriter::new()
            .persist(&mut bytes.as_slice(), &snapshot)
            .map_err(MirrorError::Snapshot)?;

        tracing::debug!(
            path = %snapshot.display(),
            compressed = compressed.len(),
            inflated = bytes.len(),
            "Manifest snapshot written"
        );

        Ok(bytes)
    }
}

/// Path of the local manifest snapshot.
pub fn snapshot_path(destination: &Path, manifest_name: &str) -> PathBuf {
    destination.join(manifest_name)
}

fn inflate(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FileTransport;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_fetch_writes_snapshot() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        fs::write(source_dir.path().join("index.Z"), compress(b"a-1\nb-1\n")).unwrap();
        fs::write(dest_dir.path().join("index"), b"old snapshot").unwrap();
        let source = Source::Local(source_dir.path().to_path_buf());

        let bytes = ManifestFetcher::new(&source, &FileTransport::new())
            .fetch("index", dest_dir.path())
            .unwrap();

        assert_eq!(bytes, b"a-1\nb-1\n");
        assert_eq!(fs::read(dest_dir.path().join("index")).unwrap(), b"a-1\nb-1\n");
    }

    #[test]
    fn test_missing_manifest_is_fetch_error() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = Source::Local(source_dir.path().to_path_buf());

        let err = ManifestFetcher::new(&source, &FileTransport::new())
            .fetch("index", dest_dir.path())
            .unwrap_err();

        assert!(matches!(err, MirrorError::Fetch(_)));
        assert!(!dest_dir.path().join("index").exists());
    }

    #[test]
    fn test_corrupt_manifest_is_decompression_error() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        fs::write(source_dir.path().join("index.Z"), b"definitely not zlib").unwrap();
        let source = Source::Local(source_dir.path().to_path_buf());

        let err = ManifestFetcher::new(&source, &FileTransport::new())
            .fetch("index", dest_dir.path())
            .unwrap_err();

        assert!(matches!(err, MirrorError::Decompression { .. }));
        assert!(!dest_dir.path().join("index").exists());
    }
}
