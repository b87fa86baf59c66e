//! Flood Engine - command-line driver
//!
//! Sets up games and replays scripted submissions through the session store.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use flood_engine::{
    EngineConfig, IntegrityError, PairResult, PlayerId, Script, SessionManager, StatsSink,
    TurnNotifier,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

const REPLAY_GAME: &str = "replay";

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::New { config, seed } => run_new(config, seed),
        Command::Replay {
            script,
            config,
            dump,
        } => run_replay(script, config, dump),
    }
}

/// Config from file (or defaults), then environment overrides.
#[instrument]
fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

/// Set up a game and print it
#[instrument]
fn run_new(config: Option<PathBuf>, seed: Option<u64>) -> Result<()> {
    let mut config = load_config(config)?;
    if seed.is_some() {
        config = config.with_seed(seed);
    }
    let game = config.new_game();
    info!(order = ?game.order(), "New game ready");
    println!("{}", game.to_json()?);
    Ok(())
}

/// Run a script and print the log
#[instrument]
fn run_replay(script: PathBuf, config: Option<PathBuf>, dump: bool) -> Result<()> {
    let config = load_config(config)?;
    let script = Script::from_file(&script)
        .with_context(|| format!("loading script {}", script.display()))?;

    let sessions = SessionManager::new(config)
        .with_notifier(Arc::new(LogNotifier))
        .with_stats(Arc::new(PrintStats));
    sessions.create_game(REPLAY_GAME)?;

    let report = script.run(&sessions, REPLAY_GAME)?;
    for line in report.lines() {
        println!("{}", line);
    }
    if let Some((index, reason)) = report.rejection() {
        println!("Step {} rejected: {}", index + 1, reason);
    }
    if dump {
        println!("{}", sessions.game(REPLAY_GAME)?.to_json()?);
    }
    info!(applied = report.applied(), "Replay complete");
    Ok(())
}

/// Logs turn changes.
struct LogNotifier;

impl TurnNotifier for LogNotifier {
    fn turn_changed(&self, game_id: &str, player: PlayerId, name: &str) {
        info!(game_id, %player, name, "Player to act");
    }
}

/// Prints pairwise results at game end.
struct PrintStats;

impl StatsSink for PrintStats {
    fn record(&self, game_id: &str, results: &[PairResult]) -> Result<(), IntegrityError> {
        info!(game_id, count = results.len(), "Recording results");
        for r in results {
            println!(
                "{} vs {}: {} - {}",
                r.first,
                r.second,
                r.first_score(),
                r.second_score()
            );
        }
        Ok(())
    }
}
