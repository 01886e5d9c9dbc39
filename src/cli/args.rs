//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Recording Organizer - match recorded TV episodes and movies against TheTVDB
#[derive(Parser, Debug)]
#[command(name = "recording-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ~/.config/recording_organizer/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// State file (overrides state_file from the configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve series and match episodes for a batch of recordings
    Run {
        /// JSON file listing the recordings
        #[arg(short, long, value_name = "FILE")]
        items: PathBuf,

        /// Output path for the run report
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Inspect the persisted state
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Manage the ignore list
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Show series mappings, cursor and ignore list
    Show,
}

#[derive(Subcommand, Debug)]
pub enum IgnoreAction {
    /// List ignored series names and movie titles
    List,

    /// Ignore a series name or movie title
    Add {
        /// Exact series name or movie title
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Stop ignoring a series name or movie title
    Remove {
        /// Exact series name or movie title
        #[arg(value_name = "KEY")]
        key: String,
    },
}
