//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;

use super::defaults::clamp_workers;
use super::file::ConfigFileError;
use super::settings::{ConfigFile, MirrorSettings};
use crate::manifest::ManifestFormat;

/// Section name (or prefix, followed by `.`) of mirror sections.
const MIRROR_SECTION: &str = "mirror";

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("workers") {
            let workers: usize = v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "download".to_string(),
                key: "workers".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            config.download.workers = clamp_workers(workers);
        }
        if let Some(v) = section.get("timeout") {
            config.download.timeout = v
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "download".to_string(),
                    key: "timeout".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
    }

    // [manifest] section
    if let Some(section) = ini.section(Some("manifest")) {
        if let Some(v) = section.get("format") {
            config.manifest.format =
                v.parse::<ManifestFormat>()
                    .map_err(|_| ConfigFileError::InvalidValue {
                        section: "manifest".to_string(),
                        key: "format".to_string(),
                        value: v.to_string(),
                        reason: "must be 'line' or 'json'".to_string(),
                    })?;
        }
    }

    // [mirror.NAME] sections, in file order
    for (name, section) in ini.iter() {
        let Some(name) = name else {
            continue;
        };
        let mirror_name = if name == MIRROR_SECTION {
            MIRROR_SECTION
        } else if let Some(suffix) = name
            .strip_prefix(MIRROR_SECTION)
            .and_then(|rest| rest.strip_prefix('.'))
        {
            suffix
        } else {
            continue;
        };

        config.mirrors.push(MirrorSettings {
            name: mirror_name.to_string(),
            from: required(name, section, "from")?.to_string(),
            to: expand_tilde(required(name, section, "to")?),
        });
    }

    Ok(config)
}

fn required<'a>(
    section_name: &str,
    section: &'a Properties,
    key: &str,
) -> Result<&'a str, ConfigFileError> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigFileError::MissingKey {
            section: section_name.to_string(),
            key: key.to_string(),
        })
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
