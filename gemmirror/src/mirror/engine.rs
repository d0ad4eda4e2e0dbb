//! The mirror engine: one run per mirror entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::entry::{CancelToken, MirrorEntry};
use super::error::{MirrorError, MirrorResult};
use super::fetcher::ArtifactFetcher;
use super::manifest::{snapshot_path, ManifestFetcher};
use super::plan::plan_downloads;
use super::pool::MirrorWorkerPool;
use super::probe::ArtifactDir;
use super::report::Reporter;
use super::summary::RunSummary;
use super::writer::{AtomicWriter, WriteHooks};
use crate::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use crate::manifest::ManifestDecoder;
use crate::transport::Transport;

/// Synchronizes mirror entries with their sources.
///
/// # Example
///
/// ```no_run
/// use gemmirror::manifest::ManifestFormat;
/// use gemmirror::mirror::{MirrorEngine, MirrorEntry};
///
/// let engine = MirrorEngine::new(ManifestFormat::Line.decoder()).with_workers(4);
/// let summary = engine.run(&MirrorEntry::new("https://gems.example.com", "/srv/mirror"))?;
/// println!("{} fetched, {} failed", summary.fetched, summary.failed());
/// # Ok::<(), gemmirror::mirror::MirrorError>(())
/// ```
pub struct MirrorEngine {
    decoder: Arc<dyn ManifestDecoder>,
    pool: MirrorWorkerPool,
    timeout: Duration,
    hooks: WriteHooks,
    transport: Option<Arc<dyn Transport>>,
    reporter: Reporter,
    cancel: CancelToken,
}

impl MirrorEngine {
    /// Create an engine using `decoder` with default options.
    pub fn new(decoder: Arc<dyn ManifestDecoder>) -> Self {
        Self {
            decoder,
            pool: MirrorWorkerPool::new(DEFAULT_WORKERS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            hooks: WriteHooks::default(),
            transport: None,
            reporter: Reporter::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Set the number of worker threads (clamped to the supported range).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.pool = MirrorWorkerPool::new(workers);
        self
    }

    /// Set the per-request timeout of the HTTP transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set hooks run around every artifact write.
    pub fn with_hooks(mut self, hooks: WriteHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use `transport` instead of the one implied by each entry's source.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the progress and error reporter.
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the token used to interrupt runs.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Number of worker threads per run.
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// The engine's cancel token.
    ///
    /// Cancelling it, or any clone of it, stops the current run from
    /// starting further downloads.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Mirror one entry.
    ///
    /// Configuration problems are detected before any network or file I/O.
    /// Per-artifact failures are collected in the returned summary; only
    /// entry-level failures are returned as errors.
    pub fn run(&self, entry: &MirrorEntry) -> MirrorResult<RunSummary> {
        let started = Instant::now();

        let source = entry.source()?;
        let artifacts = ArtifactDir::prepare(&entry.to)?;

        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => source.transport(self.timeout),
        };
        transport.prepare().map_err(MirrorError::Transport)?;

        tracing::info!(source = %source, destination = %entry.to.display(), "Mirroring");

        match artifacts.remove_stale_temporaries() {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed = removed, "Removed stale temporary files"),
            Err(e) => self.reporter.error(&format!(
                "failed to clean up temporary files in {}: {}",
                artifacts.path().display(),
                e
            )),
        }

        let manifest_name = self.decoder.manifest_name();
        let bytes = ManifestFetcher::new(&source, transport.as_ref())
            .fetch(manifest_name, &entry.to)?;
        let records = self
            .decoder
            .decode(&bytes)
            .map_err(|source| MirrorError::Decode {
                path: snapshot_path(&entry.to, manifest_name),
                source,
            })?;

        let plan = plan_downloads(records, &source, &artifacts);
        tracing::info!(
            manifest = plan.manifest_size,
            present = plan.skipped,
            missing = plan.tasks.len(),
            "Download plan ready"
        );

        let planned = plan.tasks.len();
        let fetcher = ArtifactFetcher::new(
            source,
            transport,
            AtomicWriter::with_hooks(self.hooks.clone()),
        );

        self.reporter
            .begin(planned, &format!("Fetching {} gems", planned));
        let report = self.pool.run(plan.tasks, &self.cancel, |task| {
            let outcome = fetcher.execute(task);
            self.reporter.record(&outcome);
        });
        self.reporter.done();

        let mut summary = self.reporter.take_summary();
        summary.manifest_size = plan.manifest_size;
        summary.planned = planned;
        summary.skipped += plan.skipped;
        summary.interrupted = report.interrupted;
        summary.elapsed = started.elapsed();

        tracing::info!(
            fetched = summary.fetched,
            skipped = summary.skipped,
            failed = summary.failed(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Mirror run finished"
        );

        if summary.interrupted {
            return Err(MirrorError::Interrupted(Box::new(summary)));
        }
        Ok(summary)
    }

    /// Mirror every entry in order, one result per entry.
    ///
    /// A failing entry does not prevent the next one from running; an
    /// interrupted entry ends the sequence.
    pub fn run_all(&self, entries: &[MirrorEntry]) -> Vec<MirrorResult<RunSummary>> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.cancel.is_cancelled() {
                break;
            }

            let result = self.run(entry);
            if let Err(e) = &result {
                tracing::error!(
                    destination = %entry.to.display(),
                    error = %e,
                    "Mirror entry failed"
                );
            }
            let interrupted = matches!(&result, Err(e) if e.is_interrupted());
            results.push(result);
            if interrupted {
                break;
            }
        }
        results
    }
}
