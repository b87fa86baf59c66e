//! Engine configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file is a
//! valid configuration. The `FLOOD_SEED` environment variable overrides the
//! configured seed.

use crate::engine::{Dice, Game, PLAYER_COUNT, SeededDice};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Environment variable that overrides [`EngineConfig::seed`].
pub const SEED_ENV: &str = "FLOOD_SEED";

/// Settings for creating and running games.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct EngineConfig {
    /// Seed for turn order and dice. Entropy when absent.
    #[serde(default)]
    seed: Option<u64>,

    /// Last turn played before final scoring.
    #[serde(default = "default_final_turn")]
    final_turn: u8,

    /// Seat names, in seat order.
    #[serde(default = "default_player_names")]
    player_names: [String; PLAYER_COUNT],

    /// Run the conservation checks after every applied action.
    #[serde(default = "default_check_invariants")]
    check_invariants: bool,
}

#[instrument]
fn default_final_turn() -> u8 {
    5
}

#[instrument]
fn default_player_names() -> [String; PLAYER_COUNT] {
    ["Red", "Purple", "Green"].map(String::from)
}

#[instrument]
fn default_check_invariants() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            final_turn: default_final_turn(),
            player_names: default_player_names(),
            check_invariants: default_check_invariants(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text and validates it.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(final_turn = config.final_turn, seed = ?config.seed, "Config loaded successfully");
        Ok(config)
    }

    /// Applies `FLOOD_SEED` when it is set.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        match std::env::var(SEED_ENV) {
            Ok(raw) => {
                let seed = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::new(format!("{} must be an unsigned integer: {}", SEED_ENV, e))
                })?;
                debug!(seed, "Seed taken from environment");
                Ok(self.with_seed(Some(seed)))
            }
            Err(std::env::VarError::NotPresent) => Ok(self),
            Err(e) => Err(ConfigError::new(format!("Failed to read {}: {}", SEED_ENV, e))),
        }
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=5).contains(&self.final_turn) {
            warn!(final_turn = self.final_turn, "Final turn out of range");
            return Err(ConfigError::new(format!(
                "final_turn must be between 1 and 5, got {}",
                self.final_turn
            )));
        }
        if self.player_names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::new("Player names must not be blank".to_string()));
        }
        Ok(())
    }

    /// Sets up a new game with these settings.
    #[instrument(skip(self))]
    pub fn new_game(&self) -> Game {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Game::new(self.player_names.clone(), self.final_turn, &mut rng)
    }

    /// Dice for applying actions. A fixed seed gives a reproducible game.
    pub fn dice(&self) -> Box<dyn Dice + Send> {
        match self.seed {
            Some(seed) => Box::new(SeededDice::new(seed.wrapping_add(1))),
            None => Box::new(SeededDice::from_entropy()),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
