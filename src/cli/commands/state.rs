//! State command implementation.

use crate::core::store::StateStore;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print the persisted state.
pub fn show(config: &Config, state_path: &Path) -> Result<()> {
    let store = StateStore::load(state_path, &config.working_directory);
    let state = store.state();

    println!("{} {}", "State file:".bold().cyan(), state_path.display());
    println!("Working directory: {}", state.working_directory.display());
    println!("Update cursor:     {}", state.update_cursor);
    println!();

    if state.series.is_empty() {
        println!("No series mappings.");
    } else {
        println!(
            "{:<30} {:<10} {:<30} {}",
            "Local name".bold(),
            "Id".bold(),
            "Catalog name".bold(),
            "Catalog".bold()
        );
        println!("{}", "-".repeat(90));
        for series in &state.series {
            let catalog = match &series.catalog_file {
                Some(path) if path.is_file() => "cached".green(),
                Some(_) => "missing".red(),
                None => "-".dimmed(),
            };
            println!(
                "{:<30} {:<10} {:<30} {}",
                series.local_name,
                series.canonical_id.as_deref().unwrap_or("-"),
                series.canonical_name.as_deref().unwrap_or("-"),
                catalog
            );
        }
    }

    println!();
    println!("{} {}", "Ignored:".bold(), state.ignore_items.len());
    for key in &state.ignore_items {
        println!("  {}", key);
    }

    Ok(())
}
