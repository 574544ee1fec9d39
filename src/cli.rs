//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "clipsync",
    version,
    about = "Clipsync - ownership arbitration and clock sync for timeline-driven media players",
    long_about = "Clipsync drives shared media players from a timeline.\n\n\
                  Use `clipsync simulate` to run a timeline description against a\n\
                  simulated player and inspect every transport command the engine issues."
)]
pub struct Cli {
    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a timeline file against a simulated player
    #[command(long_about = "Run a timeline file against a simulated player.\n\n\
                            Advances the timeline cursor in fixed steps, drives every clip \
                            through the engine and prints the transport commands the \
                            player received.\n\n\
                            Example:\n  clipsync simulate show.toml --step 0.25 --json")]
    Simulate {
        /// Timeline description (TOML)
        file: PathBuf,

        /// Stop the cursor here (default: one second after the last clip ends)
        #[arg(long, value_name = "SECS")]
        until: Option<f64>,

        /// Cursor step per update
        #[arg(long, value_name = "SECS", default_value_t = 0.1)]
        step: f64,

        /// Run in editor preview instead of authoritative playback
        #[arg(long)]
        preview: bool,

        /// Print the command log as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
