//! Download planning: manifest records minus artifacts already on disk.

use std::path::PathBuf;

use super::probe::{artifact_filename, ArtifactDir};
use crate::manifest::ManifestRecord;
use crate::transport::Source;

/// One artifact to download.
///
/// Created by [`plan_downloads`] and consumed exactly once by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Manifest key of the artifact.
    pub full_name: String,
    /// Remote location of the artifact.
    pub remote_url: String,
    /// Final local path of the artifact.
    pub local_path: PathBuf,
    /// The manifest record the task was planned from.
    pub record: ManifestRecord,
}

/// The result of planning one mirror run.
#[derive(Debug, Clone, Default)]
pub struct DownloadPlan {
    /// Tasks in manifest order.
    pub tasks: Vec<DownloadTask>,
    /// Records whose artifact was already present.
    pub skipped: usize,
    /// Total number of manifest records.
    pub manifest_size: usize,
}

impl DownloadPlan {
    /// Whether there is nothing to download.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Build the download plan for a set of manifest records.
///
/// Records whose artifact already exists in `artifacts` are counted as
/// skipped; the rest become tasks in manifest order. Performs no network
/// I/O.
pub fn plan_downloads(
    records: Vec<ManifestRecord>,
    source: &Source,
    artifacts: &ArtifactDir,
) -> DownloadPlan {
    let manifest_size = records.len();
    let mut skipped = 0;
    let mut tasks = Vec::new();

    for record in records {
        if artifacts.contains(&record.full_name) {
            skipped += 1;
            continue;
        }

        tasks.push(DownloadTask {
            full_name: record.full_name.clone(),
            remote_url: source.artifact_location(&artifact_filename(&record.full_name)),
            local_path: artifacts.artifact_path(&record.full_name),
            record,
        });
    }

    DownloadPlan {
        tasks,
        skipped,
        manifest_size,
    }
}
