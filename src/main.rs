//! Recording Organizer CLI
//!
//! A command-line tool that matches recorded TV episodes and movies against TheTVDB.

use clap::Parser;
use recording_organizer::cli::{
    args::{Cli, Commands, IgnoreAction, StateAction},
    commands::{ignore, run, state},
};
use recording_organizer::models::config::{load_config, Config};
use recording_organizer::preflight;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let state_path = cli.state.clone().unwrap_or_else(|| config.state_file.clone());

    // Run the appropriate command
    match cli.command {
        Commands::Run { items, output } => {
            // Run preflight checks unless skipped
            if !cli.skip_preflight {
                run_preflight_checks(&config).await?;
            }

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, stopping");
                    ctrl_c.cancel();
                }
            });

            run::run(&config, &state_path, &items, output.as_deref(), &cancel).await?;
        }

        Commands::State { action } => match action {
            StateAction::Show => {
                state::show(&config, &state_path)?;
            }
        },

        Commands::Ignore { action } => match action {
            IgnoreAction::List => {
                ignore::list(&config, &state_path)?;
            }
            IgnoreAction::Add { key } => {
                ignore::add(&config, &state_path, &key)?;
            }
            IgnoreAction::Remove { key } => {
                ignore::remove(&config, &state_path, &key)?;
            }
        },
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("recording_organizer=debug")
    } else {
        EnvFilter::new("recording_organizer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config, &config.working_directory).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
