//! Integration tests for the mirror engine.
//!
//! These tests run complete mirror passes against on-disk source trees
//! (`file://` sources) and in-memory transports:
//! - first run, second run and recovery after failures
//! - write-fault injection and atomicity of the destination
//! - configuration errors detected before any transfer
//! - case-mismatch retry and cancellation
//!
//! Run with: `cargo test --test mirror_integration`

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use tempfile::TempDir;

use gemmirror::manifest::ManifestFormat;
use gemmirror::mirror::{
    CancelToken, ErrorSink, MirrorEngine, MirrorEntry, MirrorError, NullSink, ProgressSink,
    Reporter, WriteHooks,
};
use gemmirror::transport::{ByteStream, TransferError, Transport};

// ============================================================================
// Helper Functions
// ============================================================================

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Contents used for an artifact in fixture sources.
fn gem_bytes(full_name: &str) -> Vec<u8> {
    format!("gem archive for {}", full_name)
        .repeat(100)
        .into_bytes()
}

/// A source tree on disk: `index.Z` plus `gems/<name>.gem` for every name.
struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    fn new(names: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("gems")).unwrap();
        fs::write(dir.path().join("index.Z"), compress(names.join("\n").as_bytes())).unwrap();
        for name in names {
            fs::write(
                dir.path().join(format!("gems/{}.gem", name)),
                gem_bytes(name),
            )
            .unwrap();
        }
        Self { dir }
    }

    fn url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn quiet_engine() -> MirrorEngine {
    MirrorEngine::new(ManifestFormat::Line.decoder())
        .with_workers(4)
        .with_reporter(Reporter::combined(Box::new(NullSink)))
}

fn gem_path(dest: &Path, name: &str) -> PathBuf {
    dest.join("gems").join(format!("{}.gem", name))
}

fn temporaries(dest: &Path) -> usize {
    fs::read_dir(dest.join("gems"))
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".tmp")
        })
        .count()
}

/// In-memory transport serving fixed blobs; counts every open.
#[derive(Default)]
struct MemoryTransport {
    files: HashMap<String, Vec<u8>>,
    opens: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    fn insert(&mut self, location: &str, body: Vec<u8>) {
        self.files.insert(location.to_string(), body);
    }
}

impl Transport for MemoryTransport {
    fn open(&self, location: &str) -> Result<ByteStream, TransferError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(location.to_string());
        match self.files.get(location) {
            Some(body) => Ok(Box::new(Cursor::new(body.clone()))),
            None => Err(TransferError::Status {
                url: location.to_string(),
                status: 404,
            }),
        }
    }
}

/// Sink that collects error messages and cancels after `cancel_after` updates.
struct CancellingSink {
    cancel: CancelToken,
    cancel_after: usize,
    updates: usize,
}

impl ProgressSink for CancellingSink {
    fn start(&mut self, _total: usize, _label: &str) {}

    fn update(&mut self, _message: &str) {
        self.updates += 1;
        if self.updates >= self.cancel_after {
            self.cancel.cancel();
        }
    }

    fn done(&mut self) {}
}

impl ErrorSink for CancellingSink {
    fn report(&mut self, _message: &str) {}
}

/// Error sink sharing its messages with the test.
struct CollectingErrors(Arc<Mutex<Vec<String>>>);

impl ErrorSink for CollectingErrors {
    fn report(&mut self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// 4 records, 1 already present: 3 downloads, all byte-identical.
#[test]
fn test_file_source_end_to_end() {
    let source = SourceTree::new(&["a-1.0", "b-2.0", "c-3.0", "d-4.0"]);
    let dest = TempDir::new().unwrap();
    fs::create_dir(dest.path().join("gems")).unwrap();
    fs::write(gem_path(dest.path(), "b-2.0"), gem_bytes("b-2.0")).unwrap();

    let summary = quiet_engine()
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap();

    assert_eq!(summary.manifest_size, 4);
    assert_eq!(summary.planned, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.fetched + summary.failed(), 3);
    assert!(summary.is_success());

    for name in ["a-1.0", "b-2.0", "c-3.0", "d-4.0"] {
        assert_eq!(
            fs::read(gem_path(dest.path(), name)).unwrap(),
            gem_bytes(name),
            "{} differs from source",
            name
        );
    }
    assert_eq!(
        fs::read(dest.path().join("index")).unwrap(),
        b"a-1.0\nb-2.0\nc-3.0\nd-4.0"
    );
    assert_eq!(temporaries(dest.path()), 0);
}

/// A second run over an unchanged source transfers nothing.
#[test]
fn test_second_run_is_idempotent() {
    let names: Vec<String> = (0..25).map(|i| format!("gem{}-1.0", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let source = SourceTree::new(&refs);
    let dest = TempDir::new().unwrap();
    let entry = MirrorEntry::new(source.url(), dest.path());

    let first = quiet_engine().run(&entry).unwrap();
    let second = quiet_engine().run(&entry).unwrap();

    assert_eq!(first.fetched, 25);
    assert_eq!(second.planned, 0);
    assert_eq!(second.fetched, 0);
    assert_eq!(second.skipped, 25);
}

/// Injected write faults fail single artifacts and leave nothing behind.
#[test]
fn test_write_fault_isolated_and_atomic() {
    let source = SourceTree::new(&["a-1", "b-1", "c-1", "d-1"]);
    let dest = TempDir::new().unwrap();
    let entry = MirrorEntry::new(source.url(), dest.path());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let hooks = WriteHooks::new().before_write(|path| {
        if path.ends_with("b-1.gem") {
            Err("Write error!".to_string())
        } else {
            Ok(())
        }
    });

    let summary = quiet_engine()
        .with_hooks(hooks)
        .with_reporter(Reporter::new(
            Box::new(NullSink),
            Box::new(CollectingErrors(errors.clone())),
        ))
        .run(&entry)
        .unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].full_name, "b-1");
    assert!(summary.failures[0].cause.contains("Write error!"));
    assert!(!gem_path(dest.path(), "b-1").exists());
    assert_eq!(temporaries(dest.path()), 0);
    assert_eq!(errors.lock().len(), 1);

    // A clean rerun picks up only the missing artifact.
    let rerun = quiet_engine().run(&entry).unwrap();
    assert_eq!(rerun.fetched, 1);
    assert_eq!(rerun.skipped, 3);
    assert_eq!(fs::read(gem_path(dest.path(), "b-1")).unwrap(), gem_bytes("b-1"));
}

/// Artifacts missing from the source fail without stopping the others.
#[test]
fn test_missing_artifacts_do_not_block_others() {
    let source = SourceTree::new(&["a-1", "c-1"]);
    fs::write(source.path().join("index.Z"), compress(b"a-1\nb-1\nc-1\n")).unwrap();
    let dest = TempDir::new().unwrap();

    let summary = quiet_engine()
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap();

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.is_success());
    assert!(gem_path(dest.path(), "c-1").exists());
}

/// A missing destination is reported before the source is contacted.
#[test]
fn test_missing_destination_before_any_transfer() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(MemoryTransport::default());

    let err = quiet_engine()
        .with_transport(transport.clone())
        .run(&MirrorEntry::new(
            "https://gems.example.com",
            temp.path().join("does-not-exist"),
        ))
        .unwrap_err();

    assert!(matches!(err, MirrorError::DirectoryNotFound(_)));
    assert_eq!(transport.opens.load(Ordering::SeqCst), 0);
}

/// An unsupported source scheme is a configuration error.
#[test]
fn test_unsupported_scheme() {
    let dest = TempDir::new().unwrap();

    let err = quiet_engine()
        .run(&MirrorEntry::new("ftp://gems.example.com", dest.path()))
        .unwrap_err();

    assert!(err.is_config_error());
    assert!(!dest.path().join("gems").exists());
}

/// A manifest that decompresses but cannot be decoded stays inspectable.
#[test]
fn test_undecodable_manifest_keeps_snapshot() {
    let source = SourceTree::new(&[]);
    fs::write(source.path().join("index.json.Z"), compress(b"{ not json")).unwrap();
    let dest = TempDir::new().unwrap();

    let err = MirrorEngine::new(ManifestFormat::Json.decoder())
        .with_reporter(Reporter::combined(Box::new(NullSink)))
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap_err();

    match err {
        MirrorError::Decode { path, .. } => assert_eq!(path, dest.path().join("index.json")),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(
        fs::read(dest.path().join("index.json")).unwrap(),
        b"{ not json"
    );
}

/// A corrupt compressed manifest is a decompression error.
#[test]
fn test_corrupt_manifest() {
    let source = SourceTree::new(&[]);
    fs::write(source.path().join("index.Z"), b"plain text, not zlib").unwrap();
    let dest = TempDir::new().unwrap();

    let err = quiet_engine()
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap_err();

    assert!(matches!(err, MirrorError::Decompression { .. }));
}

/// JSON manifests go through the same pipeline.
#[test]
fn test_json_manifest_end_to_end() {
    let source = SourceTree::new(&["rake-13.0.6", "nokogiri-1.15.0-x86_64-linux"]);
    let manifest = r#"[
        {"name": "rake", "version": "13.0.6", "platform": "ruby"},
        {"name": "nokogiri", "version": "1.15.0", "platform": "x86_64-linux"}
    ]"#;
    fs::write(source.path().join("index.json.Z"), compress(manifest.as_bytes())).unwrap();
    let dest = TempDir::new().unwrap();

    let summary = MirrorEngine::new(ManifestFormat::Json.decoder())
        .with_reporter(Reporter::combined(Box::new(NullSink)))
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap();

    assert_eq!(summary.fetched, 2);
    assert!(gem_path(dest.path(), "nokogiri-1.15.0-x86_64-linux").exists());
}

/// Case mismatch: the lower-cased remote name is tried once.
#[test]
fn test_case_mismatch_retry() {
    let base = "https://gems.example.com";
    let mut transport = MemoryTransport::default();
    transport.insert(
        &format!("{}/index.Z", base),
        compress(b"Rails-7.0\nMissing-1.0\n"),
    );
    transport.insert(&format!("{}/gems/rails-7.0.gem", base), b"rails".to_vec());
    let transport = Arc::new(transport);
    let dest = TempDir::new().unwrap();

    let summary = quiet_engine()
        .with_transport(transport.clone())
        .run(&MirrorEntry::new(base, dest.path()))
        .unwrap();

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.retried, 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].full_name, "Missing-1.0");
    assert_eq!(fs::read(gem_path(dest.path(), "Rails-7.0")).unwrap(), b"rails");
    assert!(!gem_path(dest.path(), "Missing-1.0").exists());

    let requests = transport.requests.lock().clone();
    let missing: Vec<_> = requests.iter().filter(|r| r.contains("issing")).collect();
    assert_eq!(missing.len(), 2);
}

/// Cancellation stops new transfers and reports the partial summary.
#[test]
fn test_cancellation_is_interrupted() {
    let names: Vec<String> = (0..10).map(|i| format!("gem{}-1.0", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let source = SourceTree::new(&refs);
    let dest = TempDir::new().unwrap();
    let cancel = CancelToken::new();
    let sink = CancellingSink {
        cancel: cancel.clone(),
        cancel_after: 1,
        updates: 0,
    };

    let err = MirrorEngine::new(ManifestFormat::Line.decoder())
        .with_workers(1)
        .with_cancel(cancel.clone())
        .with_reporter(Reporter::combined(Box::new(sink)))
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap_err();

    assert!(err.is_interrupted());
    match err {
        MirrorError::Interrupted(summary) => {
            assert_eq!(summary.planned, 10);
            assert_eq!(summary.completed, 1);
            assert!(summary.interrupted);
        }
        other => panic!("unexpected error: {}", other),
    }
    // Only the first (synchronous) task ran; nothing partial is left.
    assert!(gem_path(dest.path(), "gem0-1.0").exists());
    assert!(!gem_path(dest.path(), "gem1-1.0").exists());
    assert_eq!(temporaries(dest.path()), 0);

    // A later run completes the mirror.
    let summary = quiet_engine()
        .run(&MirrorEntry::new(source.url(), dest.path()))
        .unwrap();
    assert_eq!(summary.fetched, 9);
    assert_eq!(summary.skipped, 1);
}

/// run_all keeps going after a fatal entry error.
#[test]
fn test_run_all_independent_entries() {
    let source = SourceTree::new(&["a-1"]);
    let good = TempDir::new().unwrap();
    let missing = good.path().join("missing");

    let results = quiet_engine().run_all(&[
        MirrorEntry::new(source.url(), &missing),
        MirrorEntry::new(source.url(), good.path()),
    ]);

    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(MirrorError::DirectoryNotFound(_))));
    assert_eq!(results[1].as_ref().unwrap().fetched, 1);
}
