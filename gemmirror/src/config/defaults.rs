//! Default values and limits for configuration settings.

use super::settings::{ConfigFile, DownloadSettings, ManifestSettings};
use crate::manifest::ManifestFormat;

pub use crate::transport::DEFAULT_TIMEOUT_SECS;

/// Default number of download worker threads.
pub const DEFAULT_WORKERS: usize = 10;

/// Minimum number of download worker threads.
pub const MIN_WORKERS: usize = 1;

/// Maximum number of download worker threads.
pub const MAX_WORKERS: usize = 64;

/// Clamps the worker count to the valid range and logs a warning if clamped.
pub fn clamp_workers(value: usize) -> usize {
    if value < MIN_WORKERS {
        tracing::warn!(
            requested = value,
            min = MIN_WORKERS,
            "workers below minimum, clamping to {}",
            MIN_WORKERS
        );
        MIN_WORKERS
    } else if value > MAX_WORKERS {
        tracing::warn!(
            requested = value,
            max = MAX_WORKERS,
            "workers above maximum, clamping to {}",
            MAX_WORKERS
        );
        MAX_WORKERS
    } else {
        value
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            format: ManifestFormat::Line,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            download: DownloadSettings::default(),
            manifest: ManifestSettings::default(),
            mirrors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_workers() {
        assert_eq!(clamp_workers(0), 1);
        assert_eq!(clamp_workers(1), 1);
        assert_eq!(clamp_workers(10), 10);
        assert_eq!(clamp_workers(64), 64);
        assert_eq!(clamp_workers(65), 64);
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.download.workers, DEFAULT_WORKERS);
        assert_eq!(config.download.timeout, 300);
        assert_eq!(config.manifest.format, ManifestFormat::Line);
        assert!(config.mirrors.is_empty());
    }
}
