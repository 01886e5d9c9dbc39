//! Run command implementation.
//!
//! Reconciles a batch of recordings against TheTVDB, asking on the console
//! when a choice is needed.

use crate::core::reconciler::Reconciler;
use crate::core::source::load_recordings;
use crate::core::store::StateStore;
use crate::decision::ConsoleDecisions;
use crate::models::config::Config;
use crate::models::report::{ItemOutcome, RunReport};
use crate::services::tvdb::TvDbClient;
use crate::utils::fs::write_atomic;
use crate::{Error, Result};
use colored::Colorize;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Run the reconciliation for the recordings in `items_path`.
pub async fn run(
    config: &Config,
    state_path: &Path,
    items_path: &Path,
    output: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<RunReport> {
    println!("{}", "Reconciling recordings...".bold().cyan());
    println!();

    let mut items = load_recordings(items_path)?;
    if items.is_empty() {
        println!("No recordings found in {}", items_path.display());
    }

    let mut store = StateStore::load(state_path, &config.working_directory);
    let client = TvDbClient::new(config.tvdb.clone())?;
    let decisions = ConsoleDecisions::new();

    let reconciler = Reconciler::new(&client, &decisions, config.fetch_concurrency);
    let report = reconciler.run(&mut store, &mut items, cancel).await;

    print_summary(&report);

    if let Some(output) = output {
        let content = serde_json::to_string_pretty(&report)?;
        write_atomic(output, content.as_bytes())?;
        println!();
        println!("Report saved to: {}", output.display());
    }

    if report.cancelled {
        return Err(Error::Cancelled);
    }
    Ok(report)
}

/// Print a colored summary of a run.
pub fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "Summary".bold());
    println!("{}", "-".repeat(60));

    for entry in &report.items {
        let marker = match entry.outcome {
            ItemOutcome::Matched => "[MATCHED]".green(),
            ItemOutcome::SeriesOnly => "[SERIES]".yellow(),
            ItemOutcome::Ignored => "[IGNORED]".dimmed(),
            ItemOutcome::Unresolved => "[UNRESOLVED]".red(),
            ItemOutcome::Movie => "[MOVIE]".blue(),
        };
        let name = match &entry.series_name {
            Some(series) => format!("{}: {}", series, entry.title),
            None => entry.title.clone(),
        };
        match &entry.target {
            Some(target) => println!("{} {} -> {}", marker, name, target.display()),
            None => println!("{} {}", marker, name),
        }
    }

    println!("{}", "-".repeat(60));
    println!(
        "{} matched, {} series only, {} ignored, {} unresolved, {} movies",
        report.count(ItemOutcome::Matched).to_string().green(),
        report.count(ItemOutcome::SeriesOnly).to_string().yellow(),
        report.count(ItemOutcome::Ignored),
        report.count(ItemOutcome::Unresolved).to_string().red(),
        report.count(ItemOutcome::Movie),
    );
    if report.cancelled {
        println!("{}", "Run was cancelled; progress so far has been saved.".yellow());
    }
}
