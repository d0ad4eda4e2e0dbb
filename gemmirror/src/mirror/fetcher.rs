//! Single-artifact transfer with the case-mismatch retry policy.

use std::sync::Arc;

use super::error::{ArtifactError, PersistError};
use super::plan::DownloadTask;
use super::probe::artifact_filename;
use super::summary::{DownloadOutcome, OutcomeStatus};
use super::writer::AtomicWriter;
use crate::transport::{Source, TransferError, Transport};

/// Downloads one artifact and persists it atomically.
///
/// Shared by reference across all workers of a run.
pub struct ArtifactFetcher {
    source: Source,
    transport: Arc<dyn Transport>,
    writer: AtomicWriter,
}

impl ArtifactFetcher {
    /// Create a fetcher reading from `source` through `transport`.
    pub fn new(source: Source, transport: Arc<dyn Transport>, writer: AtomicWriter) -> Self {
        Self {
            source,
            transport,
            writer,
        }
    }

    /// Execute a task and describe how it ended.
    ///
    /// Never returns an error: failures are carried in the outcome.
    pub fn execute(&self, task: DownloadTask) -> DownloadOutcome {
        if task.local_path.is_file() {
            tracing::debug!(
                full_name = %task.full_name,
                "Artifact appeared since planning, skipping"
            );
            return DownloadOutcome::new(task, OutcomeStatus::Skipped);
        }

        let status = match self.fetch(&task) {
            Ok((bytes, retried)) => {
                tracing::debug!(
                    full_name = %task.full_name,
                    bytes = bytes,
                    retried = retried,
                    "Artifact fetched"
                );
                OutcomeStatus::Fetched { bytes, retried }
            }
            Err(e) => {
                tracing::info!(full_name = %task.full_name, error = %e, "Artifact failed");
                OutcomeStatus::Failed(e)
            }
        };

        DownloadOutcome::new(task, status)
    }

    /// Fetch the task's artifact, retrying once with a lower-cased name.
    ///
    /// Returns the bytes written and whether the retry was used.
    fn fetch(&self, task: &DownloadTask) -> Result<(u64, bool), ArtifactError> {
        let first = match self.transfer(&task.remote_url, task) {
            Ok(bytes) => return Ok((bytes, false)),
            Err(e) => e,
        };

        if !first.is_transfer() {
            return Err(first);
        }

        let filename = artifact_filename(&task.full_name);
        let lowered = filename.to_lowercase();
        if lowered == filename {
            return Err(first);
        }

        let retry_url = self.source.artifact_location(&lowered);
        tracing::info!(
            full_name = %task.full_name,
            url = %retry_url,
            error = %first,
            "Retrying with lower-cased name"
        );

        self.transfer(&retry_url, task).map(|bytes| (bytes, true))
    }

    fn transfer(&self, url: &str, task: &DownloadTask) -> Result<u64, ArtifactError> {
        let mut stream = self.transport.open(url)?;

        self.writer
            .persist(&mut stream, &task.local_path)
            .map_err(|e| match e {
                PersistError::Read(source) => ArtifactError::Transfer(TransferError::Read {
                    url: url.to_string(),
                    source,
                }),
                other => ArtifactError::Persist(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestRecord;
    use crate::mirror::writer::WriteHooks;
    use crate::transport::ByteStream;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    /// In-memory transport keyed by location; records every request.
    struct MapTransport {
        files: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl MapTransport {
        fn new(files: &[(&str, &[u8])]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl Transport for MapTransport {
        fn open(&self, location: &str) -> Result<ByteStream, TransferError> {
            self.requests.lock().push(location.to_string());
            match self.files.get(location) {
                Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
                None => Err(TransferError::Status {
                    url: location.to_string(),
                    status: 404,
                }),
            }
        }
    }

    const BASE: &str = "http://gems.example.com";

    fn task(dir: &Path, name: &str) -> DownloadTask {
        DownloadTask {
            full_name: name.to_string(),
            remote_url: format!("{}/gems/{}.gem", BASE, name),
            local_path: dir.join(format!("{}.gem", name)),
            record: ManifestRecord::new(name),
        }
    }

    fn fetcher(transport: Arc<MapTransport>, writer: AtomicWriter) -> ArtifactFetcher {
        ArtifactFetcher::new(Source::Http(BASE.to_string()), transport, writer)
    }

    #[test]
    fn test_fetch_success() {
        let temp = TempDir::new().unwrap();
        let transport = Arc::new(MapTransport::new(&[(
            "http://gems.example.com/gems/rake-1.0.gem",
            b"rake",
        )]));

        let outcome =
            fetcher(transport.clone(), AtomicWriter::new()).execute(task(temp.path(), "rake-1.0"));

        assert!(matches!(
            outcome.status,
            OutcomeStatus::Fetched {
                bytes: 4,
                retried: false
            }
        ));
        assert_eq!(fs::read(temp.path().join("rake-1.0.gem")).unwrap(), b"rake");
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_case_mismatch_retry_succeeds() {
        let temp = TempDir::new().unwrap();
        let transport = Arc::new(MapTransport::new(&[(
            "http://gems.example.com/gems/rake-1.0.gem",
            b"lower",
        )]));

        let outcome =
            fetcher(transport.clone(), AtomicWriter::new()).execute(task(temp.path(), "Rake-1.0"));

        assert!(matches!(
            outcome.status,
            OutcomeStatus::Fetched { retried: true, .. }
        ));
        // Local name keeps the manifest's case.
        assert_eq!(fs::read(temp.path().join("Rake-1.0.gem")).unwrap(), b"lower");
        assert_eq!(
            transport.requests(),
            [
                "http://gems.example.com/gems/Rake-1.0.gem",
                "http://gems.example.com/gems/rake-1.0.gem",
            ]
        );
    }

    #[test]
    fn test_case_mismatch_retry_fails_once() {
        let temp = TempDir::new().unwrap();
        let transport = Arc::new(MapTransport::new(&[]));

        let outcome =
            fetcher(transport.clone(), AtomicWriter::new()).execute(task(temp.path(), "Rake-1.0"));

        assert!(outcome.is_failed());
        assert_eq!(transport.requests().len(), 2);
        assert!(!temp.path().join("Rake-1.0.gem").exists());
    }

    #[test]
    fn test_no_retry_for_lowercase_name() {
        let temp = TempDir::new().unwrap();
        let transport = Arc::new(MapTransport::new(&[]));

        let outcome =
            fetcher(transport.clone(), AtomicWriter::new()).execute(task(temp.path(), "rake-1.0"));

        assert!(outcome.is_failed());
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_no_retry_for_persist_failure() {
        let temp = TempDir::new().unwrap();
        let transport = Arc::new(MapTransport::new(&[(
            "http://gems.example.com/gems/Rake-1.0.gem",
            b"upper",
        )]));
        let hooks = WriteHooks::new().before_write(|_| Err("disk full".to_string()));

        let outcome = fetcher(transport.clone(), AtomicWriter::with_hooks(hooks))
            .execute(task(temp.path(), "Rake-1.0"));

        match outcome.status {
            OutcomeStatus::Failed(ArtifactError::Persist(PersistError::Rejected {
                reason, ..
            })) => assert_eq!(reason, "disk full"),
            other => panic!("unexpected status: {:?}", other),
        }
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_existing_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rake-1.0.gem"), b"already").unwrap();
        let transport = Arc::new(MapTransport::new(&[]));

        let outcome =
            fetcher(transport.clone(), AtomicWriter::new()).execute(task(temp.path(), "rake-1.0"));

        assert!(matches!(outcome.status, OutcomeStatus::Skipped));
        assert!(transport.requests().is_empty());
    }
}
