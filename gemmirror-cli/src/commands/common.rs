//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use gemmirror::config::{clamp_workers, config_file_path, ConfigFile};
use gemmirror::manifest::ManifestFormat;

use crate::error::CliError;

/// Options accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Configuration file (default: ~/.gemmirror/config.ini)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of download threads (overrides config when greater than 0)
    #[arg(short = 'w', long, global = true, value_name = "N")]
    pub workers: Option<usize>,

    /// Manifest format published by the sources (overrides config)
    #[arg(long, global = true, value_enum)]
    pub format: Option<FormatArg>,

    /// Log to stderr only, without writing ~/.gemmirror/gemmirror.log
    #[arg(long, global = true)]
    pub no_log_file: bool,
}

impl GlobalArgs {
    /// Config file path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

/// Manifest format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    /// Plain text index, one gem per line (index.Z)
    Line,
    /// JSON array index (index.json.Z)
    Json,
}

impl From<FormatArg> for ManifestFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Line => ManifestFormat::Line,
            FormatArg::Json => ManifestFormat::Json,
        }
    }
}

/// Load the config file named on the command line, or the default one.
///
/// An explicitly named file must exist; a missing default file yields the
/// default configuration.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_existing(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Apply command-line overrides to a loaded configuration.
pub fn apply_overrides(config: &mut ConfigFile, args: &GlobalArgs) {
    if let Some(workers) = args.workers.filter(|w| *w > 0) {
        config.download.workers = clamp_workers(workers);
    }
    if let Some(format) = args.format {
        config.manifest.format = format.into();
    }
}

/// Load the configuration and apply command-line overrides.
pub fn effective_config(args: &GlobalArgs) -> Result<ConfigFile, CliError> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    Ok(config)
}
