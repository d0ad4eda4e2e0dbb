//! Local state of a mirror destination.
//!
//! The probe owns the naming convention for artifacts on disk
//! (`<destination>/gems/<full_name>.gem`) and answers "is this artifact
//! already here?" for the planner.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::{MirrorError, MirrorResult};
use super::writer::TEMP_SUFFIX;

/// Name of the artifacts directory, both remotely and locally.
pub const ARTIFACTS_DIR: &str = "gems";

/// File extension of artifacts.
pub const ARTIFACT_EXTENSION: &str = "gem";

/// File name of the artifact for a manifest full name.
///
/// # Examples
///
/// ```
/// use gemmirror::mirror::artifact_filename;
///
/// assert_eq!(artifact_filename("rake-13.0.6"), "rake-13.0.6.gem");
/// ```
pub fn artifact_filename(full_name: &str) -> String {
    format!("{}.{}", full_name, ARTIFACT_EXTENSION)
}

/// The validated `gems` directory of a mirror destination.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    path: PathBuf,
}

impl ArtifactDir {
    /// Validate a destination directory and prepare its `gems` directory.
    ///
    /// The destination must exist and be a directory. The `gems`
    /// subdirectory is created if missing; if it exists it must be a
    /// directory.
    pub fn prepare(destination: &Path) -> MirrorResult<Self> {
        ensure_directory(destination)?;

        let path = destination.join(ARTIFACTS_DIR);
        if path.exists() {
            ensure_directory(&path)?;
        } else {
            fs::create_dir(&path).map_err(|e| MirrorError::LocalIo {
                path: path.clone(),
                source: e,
            })?;
        }

        Ok(Self { path })
    }

    /// Path of the `gems` directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local path of the artifact for a full name.
    pub fn artifact_path(&self, full_name: &str) -> PathBuf {
        self.path.join(artifact_filename(full_name))
    }

    /// Whether the artifact for a full name is already present.
    pub fn contains(&self, full_name: &str) -> bool {
        self.artifact_path(full_name).is_file()
    }

    /// Delete temporary files left behind by an interrupted run.
    ///
    /// Returns the number of files removed.
    pub fn remove_stale_temporaries(&self) -> io::Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let is_temp = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(TEMP_SUFFIX));
            if is_temp && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn ensure_directory(path: &Path) -> MirrorResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(MirrorError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(MirrorError::DirectoryNotFound(path.to_path_buf()))
        }
        Err(e) => Err(MirrorError::LocalIo {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
