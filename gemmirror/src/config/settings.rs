//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::manifest::ManifestFormat;
use crate::mirror::MirrorEntry;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Download settings
    pub download: DownloadSettings,
    /// Manifest settings
    pub manifest: ManifestSettings,
    /// Mirror entries, in file order
    pub mirrors: Vec<MirrorSettings>,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Number of worker threads (already clamped)
    pub workers: usize,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl DownloadSettings {
    /// Per-request timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Manifest configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSettings {
    /// Manifest format published by the sources
    pub format: ManifestFormat,
}

/// One `[mirror.NAME]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSettings {
    /// Section suffix after `mirror.`, or `mirror` for a bare section
    pub name: String,
    /// Source location
    pub from: String,
    /// Destination directory, with `~` expanded
    pub to: PathBuf,
}

impl MirrorSettings {
    /// Convert to an engine mirror entry.
    pub fn to_entry(&self) -> MirrorEntry {
        MirrorEntry::new(self.from.clone(), self.to.clone())
    }
}

impl ConfigFile {
    /// Mirror entries in file order.
    pub fn mirror_entries(&self) -> Vec<MirrorEntry> {
        self.mirrors.iter().map(MirrorSettings::to_entry).collect()
    }
}
