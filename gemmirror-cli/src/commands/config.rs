//! Config command - print the effective configuration.

use gemmirror::config::ConfigFile;

use super::common::{effective_config, GlobalArgs};
use crate::error::CliError;

/// Run the config command.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let path = args.config_path();
    let config = effective_config(args)?;

    println!("Configuration file: {}", path.display());
    if !path.exists() {
        println!("  (not found, using defaults)");
    }
    println!();
    print!("{}", render(&config));
    Ok(())
}

/// Render the effective configuration for display.
fn render(config: &ConfigFile) -> String {
    let mut out = String::new();
    out.push_str("[download]\n");
    out.push_str(&format!("  workers = {}\n", config.download.workers));
    out.push_str(&format!("  timeout = {}s\n", config.download.timeout));
    out.push_str("[manifest]\n");
    out.push_str(&format!("  format = {}\n", config.manifest.format));

    if config.mirrors.is_empty() {
        out.push_str("\nNo mirrors configured.\n");
    }
    for mirror in &config.mirrors {
        out.push_str(&format!("\n[mirror.{}]\n", mirror.name));
        out.push_str(&format!("  from = {}\n", mirror.from));
        out.push_str(&format!("  to = {}\n", mirror.to.display()));
    }
    out
}
