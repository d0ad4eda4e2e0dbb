//! Init command - initialize configuration file.

use gemmirror::config::ConfigFile;

use super::common::GlobalArgs;
use crate::error::CliError;

/// Run the init command.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let path = args.config_path();

    if ConfigFile::write_template(&path)? {
        println!("Created configuration file: {}", path.display());
        println!();
        println!("Add one [mirror.NAME] section per repository, then run 'gemmirror'.");
    } else {
        println!("Configuration file already exists: {}", path.display());
    }
    Ok(())
}
