//! Concurrent mirror engine.
//!
//! One [`MirrorEngine::run`] synchronizes a single [`MirrorEntry`]:
//!
//! ```text
//! MirrorEntry ──► ArtifactDir::prepare ──► ManifestFetcher ──► ManifestDecoder
//!                                                                   │
//!       RunSummary ◄── Reporter ◄── MirrorWorkerPool ◄── plan_downloads
//!                                    (ArtifactFetcher + AtomicWriter per task)
//! ```
//!
//! # Workers
//!
//! The calling thread plans the run, executes the first task itself and
//! then feeds the rest through a bounded queue to the worker threads. Each
//! worker cycles through:
//!
//! ```text
//! Idle ──► FetchInFlight ──► Writing ──► ReportingOutcome ──► Idle
//!   │
//!   └──► Stopped   (on a stop message)
//! ```
//!
//! # Failure tiers
//!
//! Entry-level problems (bad configuration, unreachable or corrupt manifest)
//! are returned as [`MirrorError`]. Artifact-level problems are recorded in
//! the [`RunSummary`] and never stop the other workers.

mod engine;
mod entry;
mod error;
mod fetcher;
mod manifest;
mod plan;
mod pool;
mod probe;
mod report;
mod summary;
mod writer;

pub use engine::MirrorEngine;
pub use entry::{CancelToken, MirrorEntry};
pub use error::{ArtifactError, MirrorError, MirrorResult, PersistError};
pub use fetcher::ArtifactFetcher;
pub use manifest::{snapshot_path, ManifestFetcher};
pub use plan::{plan_downloads, DownloadPlan, DownloadTask};
pub use pool::{MirrorWorkerPool, PoolReport};
pub use probe::{artifact_filename, ArtifactDir, ARTIFACTS_DIR, ARTIFACT_EXTENSION};
pub use report::{ErrorSink, NullSink, ProgressSink, Reporter, Sink, TracingReporter};
pub use summary::{DownloadOutcome, Failure, OutcomeStatus, RunSummary};
pub use writer::{temp_path, AfterWriteHook, AtomicWriter, BeforeWriteHook, WriteHooks, TEMP_SUFFIX};
