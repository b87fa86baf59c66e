//! Command-line interface for flood_engine.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flood Engine - rules engine for After The Flood
#[derive(Parser, Debug)]
#[command(name = "flood_engine")]
#[command(about = "Deterministic rules engine for a three-player board game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set up a new game and print its state as JSON
    New {
        /// Path to engine config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for turn order and dice (overrides config and FLOOD_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replay a script of submissions against a fresh game
    Replay {
        /// Path to the replay script (TOML)
        #[arg(short, long)]
        script: PathBuf,

        /// Path to engine config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the final game state as JSON
        #[arg(long)]
        dump: bool,
    },
}
