//! INI serialization logic for converting `ConfigFile` → INI string.

use std::fmt::Write;
use std::path::Path;

use super::defaults::{MAX_WORKERS, MIN_WORKERS};
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mut out = format!(
        r#"[download]
; Number of concurrent download threads ({min}-{max})
workers = {workers}
; Per-request timeout in seconds
timeout = {timeout}

[manifest]
; Manifest format published by the sources:
;   line - plain text index, one gem per line (index.Z)
;   json - JSON array (index.json.Z)
format = {format}
"#,
        min = MIN_WORKERS,
        max = MAX_WORKERS,
        workers = config.download.workers,
        timeout = config.download.timeout,
        format = config.manifest.format,
    );

    for mirror in &config.mirrors {
        let section = if mirror.name == "mirror" {
            "mirror".to_string()
        } else {
            format!("mirror.{}", mirror.name)
        };
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n[{}]\nfrom = {}\nto = {}\n",
            section,
            mirror.from,
            path_to_string(&mirror.to)
        );
    }

    out
}

/// Default configuration plus a commented example mirror.
pub(super) fn template() -> String {
    let mut out = to_config_string(&ConfigFile::default());
    out.push_str(
        r#"
; One section per mirror, processed in file order.
; `from` is an http(s) URL, a file:// URL or a local directory.
; `to` must be an existing directory; `~` expands to your home directory.
;
; [mirror.rubygems]
; from = https://rubygems.org
; to = ~/mirror/rubygems
"#,
    );
    out
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
