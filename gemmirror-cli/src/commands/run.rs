//! Run command - mirror every configured repository.

use console::style;
use gemmirror::config::MirrorSettings;
use gemmirror::mirror::{MirrorEngine, MirrorError, Reporter, RunSummary};

use super::common::{effective_config, GlobalArgs};
use crate::error::CliError;
use crate::ui::ConsoleReporter;

/// Run the mirror command.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let config = effective_config(args)?;
    let entries = config.mirror_entries();
    if entries.is_empty() {
        return Err(CliError::Config(format!(
            "no mirrors configured in {}",
            args.config_path().display()
        )));
    }

    let engine = MirrorEngine::new(config.manifest.format.decoder())
        .with_workers(config.download.workers)
        .with_timeout(config.download.timeout_duration())
        .with_reporter(Reporter::combined(Box::new(ConsoleReporter::new())));

    let cancel = engine.cancel_token().clone();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, finishing downloads in progress...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    tracing::info!(
        mirrors = entries.len(),
        workers = config.download.workers,
        manifest_format = %config.manifest.format,
        "Starting gemmirror {}",
        gemmirror::VERSION
    );

    let results = engine.run_all(&entries);

    let mut failed = 0;
    for (settings, result) in config.mirrors.iter().zip(&results) {
        if !print_result(settings, result) {
            failed += 1;
        }
    }

    if cancel.is_cancelled() {
        return Err(CliError::Interrupted);
    }
    if failed > 0 {
        return Err(CliError::MirrorFailed {
            failed,
            total: entries.len(),
        });
    }
    Ok(())
}

/// Print the outcome of one mirror entry. Returns `true` on full success.
fn print_result(settings: &MirrorSettings, result: &Result<RunSummary, MirrorError>) -> bool {
    let label = style(format!("[{}]", settings.name)).bold();
    match result {
        Ok(summary) => {
            let mark = if summary.is_success() {
                style("✓").green()
            } else {
                style("✗").red()
            };
            println!("{} {} {}", mark, label, summary_line(summary));
            for failure in &summary.failures {
                println!("    {} {}", style("failed:").red(), failure.full_name);
            }
            summary.is_success()
        }
        Err(MirrorError::Interrupted(summary)) => {
            println!(
                "{} {} {} (interrupted)",
                style("!").yellow(),
                label,
                summary_line(summary)
            );
            false
        }
        Err(e) => {
            println!("{} {} {}", style("✗").red(), label, e);
            false
        }
    }
}

/// One-line summary of a run.
pub fn summary_line(summary: &RunSummary) -> String {
    format!(
        "{} gems in manifest, {} already present, {} fetched, {} failed",
        summary.manifest_size,
        summary.skipped,
        summary.fetched,
        summary.failed()
    )
}
