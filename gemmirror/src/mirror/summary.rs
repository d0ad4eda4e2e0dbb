//! Per-task outcomes and the run summary.

use std::time::Duration;

use super::error::ArtifactError;
use super::plan::DownloadTask;

/// How a single download task ended.
#[derive(Debug)]
pub enum OutcomeStatus {
    /// The artifact was downloaded and promoted to its final path.
    Fetched {
        /// Bytes written.
        bytes: u64,
        /// Whether the lower-cased remote name was needed.
        retried: bool,
    },
    /// The artifact was already present when the task ran.
    Skipped,
    /// The artifact could not be mirrored.
    Failed(ArtifactError),
}

/// Result of executing one [`DownloadTask`].
#[derive(Debug)]
pub struct DownloadOutcome {
    pub task: DownloadTask,
    pub status: OutcomeStatus,
}

impl DownloadOutcome {
    /// Create an outcome for a task.
    pub fn new(task: DownloadTask, status: OutcomeStatus) -> Self {
        Self { task, status }
    }

    /// Whether the task failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

/// A failed artifact, as recorded in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Full name of the artifact.
    pub full_name: String,
    /// Remote location that was requested first.
    pub url: String,
    /// Human-readable cause.
    pub cause: String,
}

/// Aggregate result of one mirror run.
///
/// Failures are listed in completion order, not manifest order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of records in the decoded manifest.
    pub manifest_size: usize,
    /// Number of download tasks planned.
    pub planned: usize,
    /// Number of tasks that produced an outcome.
    pub completed: usize,
    /// Artifacts already present (before planning or when their task ran).
    pub skipped: usize,
    /// Artifacts downloaded during this run.
    pub fetched: usize,
    /// Artifacts that needed the lower-cased remote name.
    pub retried: usize,
    /// Bytes written for fetched artifacts.
    pub bytes_fetched: u64,
    /// Failed artifacts, in completion order.
    pub failures: Vec<Failure>,
    /// Whether the run was interrupted before all tasks ran.
    pub interrupted: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of failed artifacts.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every planned artifact is now present locally.
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.failures.is_empty()
    }

    /// Record a task outcome.
    pub(crate) fn record(&mut self, outcome: &DownloadOutcome) {
        self.completed += 1;
        match &outcome.status {
            OutcomeStatus::Fetched { bytes, retried } => {
                self.fetched += 1;
                self.bytes_fetched += bytes;
                if *retried {
                    self.retried += 1;
                }
            }
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed(error) => self.failures.push(Failure {
                full_name: outcome.task.full_name.clone(),
                url: outcome.task.remote_url.clone(),
                cause: error.to_string(),
            }),
        }
    }
}
