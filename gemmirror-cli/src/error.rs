//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use gemmirror::config::ConfigFileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to read or write the config file
    ConfigFile(ConfigFileError),
    /// One or more mirror entries did not complete cleanly
    MirrorFailed { failed: usize, total: usize },
    /// The Ctrl-C handler could not be installed
    SignalHandler(String),
    /// The run was interrupted with Ctrl-C
    Interrupted,
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        if let Some(hint) = self.hint() {
            eprintln!();
            eprintln!("{}", hint);
        }
        process::exit(1)
    }

    /// Follow-up advice printed after the error message, if any applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => Some(
                "Run 'gemmirror init' to create a configuration file,\n\
                 then add one [mirror.NAME] section per repository.",
            ),
            CliError::Interrupted => Some("Completed downloads were kept; run again to resume."),
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::MirrorFailed { failed, total } => {
                write!(f, "{} of {} mirrors did not complete cleanly", failed, total)
            }
            CliError::SignalHandler(msg) => {
                write!(f, "Failed to install interrupt handler: {}", msg)
            }
            CliError::Interrupted => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}
