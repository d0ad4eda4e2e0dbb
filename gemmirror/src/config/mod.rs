//! Configuration file handling for `~/.gemmirror/config.ini`.
//!
//! # Example
//!
//! ```ini
//! [download]
//! workers = 10
//! timeout = 300
//!
//! [manifest]
//! format = line
//!
//! [mirror.rubygems]
//! from = https://rubygems.org
//! to = ~/mirror/rubygems
//! ```
//!
//! Mirror sections are read in file order and become
//! [`MirrorEntry`](crate::mirror::MirrorEntry) values through
//! [`ConfigFile::mirror_entries`].

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    clamp_workers, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS, MAX_WORKERS, MIN_WORKERS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DownloadSettings, ManifestSettings, MirrorSettings};
