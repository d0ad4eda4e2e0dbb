//! gemmirror CLI - Command-line interface
//!
//! Mirrors every gem repository listed in `~/.gemmirror/config.ini` (or the
//! file given with `--config`) into its local destination directory.

mod commands;
mod error;
mod ui;

use clap::{Parser, Subcommand};
use gemmirror::config::config_directory;
use gemmirror::logging::{default_log_file, init_logging, init_stderr_logging, LoggingGuard};

use commands::common::GlobalArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "gemmirror")]
#[command(version = gemmirror::VERSION)]
#[command(about = "Mirror a remote gem repository to a local directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror every configured repository (default)
    Run,

    /// Print the effective configuration
    Config,

    /// Write a commented template configuration file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let _logging = match setup_logging(&cli.global) {
        Ok(guard) => guard,
        Err(e) => e.exit(),
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&cli.global),
        Commands::Config => commands::config::run(&cli.global),
        Commands::Init => commands::init::run(&cli.global),
    };

    if let Err(e) = result {
        e.exit();
    }
}

fn setup_logging(args: &GlobalArgs) -> Result<LoggingGuard, CliError> {
    if args.no_log_file {
        return Ok(init_stderr_logging());
    }
    init_logging(&config_directory(), default_log_file())
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}
