//! In-memory game sessions.
//!
//! The engine itself never persists anything; it returns a [`Directive`] and
//! the host decides what to keep. [`SessionManager`] is that host for tests
//! and the CLI: a durable snapshot per game guarded by a [`Version`], plus an
//! optional speculative snapshot that `Cache` writes and `Undo` throws away.

use crate::config::EngineConfig;
use crate::engine::{
    Dice, Directive, EngineError, Game, IntegrityError, Outcome, PairResult, PlayerId, Submission,
};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game.
pub type GameId = String;

// ─────────────────────────────────────────────────────────────
//  Versions and stored snapshots
// ─────────────────────────────────────────────────────────────

/// Optimistic-concurrency token for a durable snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Version {
    updated_at: DateTime<Utc>,
    counter: u64,
}

impl Version {
    fn first() -> Self {
        Self::new(Utc::now(), 1)
    }

    fn next(&self) -> Self {
        Self::new(Utc::now(), self.counter + 1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{} ({})", self.counter, self.updated_at.to_rfc3339())
    }
}

/// A durable snapshot as JSON, with the version it was written at.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct Stored {
    snapshot: String,
    version: Version,
}

impl Stored {
    /// Decodes the snapshot.
    pub fn game(&self) -> Result<Game, IntegrityError> {
        Game::from_json(&self.snapshot)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    durable: Stored,
    speculative: Option<String>,
}

// ─────────────────────────────────────────────────────────────
//  Errors
// ─────────────────────────────────────────────────────────────

/// Failure to write a durable snapshot.
#[derive(Debug, Clone, Display, From, Error)]
pub enum StoreError {
    /// Someone else saved first; reload and retry.
    #[display("Game {} was updated concurrently: expected {}, found {}", id, expected, found)]
    Conflict {
        /// Game that was being saved.
        id: GameId,
        /// Version the caller read.
        expected: Version,
        /// Version currently stored.
        found: Version,
    },
    /// A create collided with an existing game.
    #[display("Game {} already exists", _0)]
    AlreadyExists(#[error(not(source))] GameId),
    /// The snapshot could not be written or the store is corrupt.
    #[display("{}", _0)]
    #[from]
    Integrity(IntegrityError),
}

/// Failure of a session call.
#[derive(Debug, Clone, Display, From, Error)]
pub enum SessionError {
    /// The engine rejected or failed the action.
    #[display("{}", _0)]
    Engine(EngineError),
    /// The resulting state could not be stored.
    #[display("{}", _0)]
    Store(StoreError),
}

impl From<IntegrityError> for SessionError {
    fn from(err: IntegrityError) -> Self {
        SessionError::Engine(EngineError::Integrity(err))
    }
}

impl SessionError {
    /// True when the host must abort the request.
    pub fn is_fatal(&self) -> bool {
        match self {
            SessionError::Engine(e) => e.is_fatal(),
            SessionError::Store(StoreError::Integrity(_)) => true,
            SessionError::Store(_) => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Host collaborator contracts
// ─────────────────────────────────────────────────────────────

/// Durable per-game storage with optimistic concurrency.
pub trait GameStore {
    /// Current durable snapshot.
    fn load(&self, id: &str) -> Result<Stored, IntegrityError>;

    /// Writes `game`, failing if the stored version is not `expected`.
    ///
    /// `expected = None` creates a new game. A successful save drops any
    /// speculative snapshot.
    fn save(&self, id: &str, game: &Game, expected: Option<Version>)
    -> Result<Version, StoreError>;
}

/// Speculative per-game snapshots for undo.
pub trait UndoCache {
    /// The speculative snapshot, if one is held.
    fn cached(&self, id: &str) -> Result<Option<Game>, IntegrityError>;

    /// Holds `game` speculatively on top of durable version `base`.
    fn cache(&self, id: &str, game: &Game, base: Version) -> Result<(), StoreError>;

    /// Drops the speculative snapshot.
    fn discard(&self, id: &str) -> Result<(), IntegrityError>;
}

/// Told whenever a different player must act next.
pub trait TurnNotifier: Send + Sync {
    /// `player` is now the acting player of `game_id`.
    fn turn_changed(&self, game_id: &str, player: PlayerId, name: &str);
}

/// Receives final placements for rating.
pub trait StatsSink: Send + Sync {
    /// Records the pairwise results of a finished game.
    fn record(&self, game_id: &str, results: &[PairResult]) -> Result<(), IntegrityError>;
}

// ─────────────────────────────────────────────────────────────
//  Session manager
// ─────────────────────────────────────────────────────────────

/// Manages all games held in memory.
#[derive(Clone)]
pub struct SessionManager {
    games: Arc<Mutex<HashMap<GameId, Entry>>>,
    dice: Arc<Mutex<Box<dyn Dice + Send>>>,
    config: EngineConfig,
    notifier: Option<Arc<dyn TurnNotifier>>,
    stats: Option<Arc<dyn StatsSink>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("notifier", &self.notifier.is_some())
            .field("stats", &self.stats.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates an empty manager with dice taken from `config`.
    #[instrument(skip(config))]
    pub fn new(config: EngineConfig) -> Self {
        info!("Creating session manager");
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
            dice: Arc::new(Mutex::new(config.dice())),
            config,
            notifier: None,
            stats: None,
        }
    }

    /// Replaces the dice.
    pub fn with_dice(mut self, dice: Box<dyn Dice + Send>) -> Self {
        self.dice = Arc::new(Mutex::new(dice));
        self
    }

    /// Installs the turn notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn TurnNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Installs the stats sink.
    pub fn with_stats(mut self, stats: Arc<dyn StatsSink>) -> Self {
        self.stats = Some(stats);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<GameId, Entry>>, IntegrityError> {
        self.games
            .lock()
            .map_err(|_| IntegrityError::new("Session table lock poisoned"))
    }

    /// Sets up a new game under `id` and stores it durably.
    #[instrument(skip(self))]
    pub fn create_game(&self, id: &str) -> Result<Version, SessionError> {
        let game = self.config.new_game();
        let version = self.save(id, &game, None)?;
        info!(game_id = id, %version, "Created new game");
        Ok(version)
    }

    /// The state the next submission will see: speculative if cached,
    /// otherwise durable.
    #[instrument(skip(self))]
    pub fn game(&self, id: &str) -> Result<Game, IntegrityError> {
        match self.cached(id)? {
            Some(game) => Ok(game),
            None => self.load(id)?.game(),
        }
    }

    /// Lists all game ids.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameId>, IntegrityError> {
        let mut ids: Vec<_> = self.lock()?.keys().cloned().collect();
        ids.sort();
        info!(count = ids.len(), "Listed games");
        Ok(ids)
    }

    /// Applies one submission and honors the resulting directive.
    ///
    /// The table lock is not held while the engine runs; a concurrent save
    /// on the same game surfaces as [`StoreError::Conflict`].
    #[instrument(skip(self, submission), fields(action = %submission.kind(), player = %submission.player()))]
    pub fn submit(&self, id: &str, submission: &Submission) -> Result<Outcome, SessionError> {
        let base = *self.load(id)?.version();
        let mut game = self.game(id)?;

        let outcome = {
            let mut dice = self
                .dice
                .lock()
                .map_err(|_| IntegrityError::new("Dice lock poisoned"))?;
            game.apply(submission, dice.as_mut(), *self.config.check_invariants())?
        };

        if outcome.results().is_some() && self.stats.is_none() {
            warn!(game_id = id, "Game finished with no stats sink");
            return Err(IntegrityError::new("No stats sink to record a finished game").into());
        }

        match outcome.directive() {
            Directive::None => {}
            Directive::Cache => self.cache(id, &game, base)?,
            Directive::Undo => self.discard(id)?,
            Directive::Save => {
                self.save(id, &game, Some(base))?;
            }
        }
        debug!(directive = %outcome.directive(), "Directive honored");

        if let (Some(player), Some(notifier)) = (outcome.notify(), &self.notifier) {
            notifier.turn_changed(id, *player, game.name_of(*player));
        }
        if let (Some(results), Some(stats)) = (outcome.results(), &self.stats) {
            stats.record(id, results)?;
        }
        Ok(outcome)
    }
}

impl GameStore for SessionManager {
    #[instrument(skip(self))]
    fn load(&self, id: &str) -> Result<Stored, IntegrityError> {
        self.lock()?
            .get(id)
            .map(|e| e.durable.clone())
            .ok_or_else(|| IntegrityError::new(format!("Unknown game {}", id)))
    }

    #[instrument(skip(self, game))]
    fn save(
        &self,
        id: &str,
        game: &Game,
        expected: Option<Version>,
    ) -> Result<Version, StoreError> {
        let snapshot = game.to_json()?;
        let mut games = self.lock()?;
        let version = match (games.get(id), expected) {
            (None, None) => Version::first(),
            (None, Some(_)) => {
                return Err(IntegrityError::new(format!("Unknown game {}", id)).into());
            }
            (Some(_), None) => return Err(StoreError::AlreadyExists(id.to_string())),
            (Some(entry), Some(expected)) => {
                let found = *entry.durable.version();
                if found != expected {
                    warn!(%expected, %found, "Stale save rejected");
                    return Err(StoreError::Conflict {
                        id: id.to_string(),
                        expected,
                        found,
                    });
                }
                found.next()
            }
        };
        games.insert(
            id.to_string(),
            Entry {
                durable: Stored::new(snapshot, version),
                speculative: None,
            },
        );
        debug!(%version, "Game saved");
        Ok(version)
    }
}

impl UndoCache for SessionManager {
    fn cached(&self, id: &str) -> Result<Option<Game>, IntegrityError> {
        let games = self.lock()?;
        let entry = games
            .get(id)
            .ok_or_else(|| IntegrityError::new(format!("Unknown game {}", id)))?;
        entry.speculative.as_deref().map(Game::from_json).transpose()
    }

    #[instrument(skip(self, game))]
    fn cache(&self, id: &str, game: &Game, base: Version) -> Result<(), StoreError> {
        let snapshot = game.to_json()?;
        let mut games = self.lock()?;
        let entry = games
            .get_mut(id)
            .ok_or_else(|| IntegrityError::new(format!("Unknown game {}", id)))?;
        let found = *entry.durable.version();
        if found != base {
            warn!(expected = %base, %found, "Stale cache rejected");
            return Err(StoreError::Conflict {
                id: id.to_string(),
                expected: base,
                found,
            });
        }
        entry.speculative = Some(snapshot);
        debug!("Speculative state cached");
        Ok(())
    }

    #[instrument(skip(self))]
    fn discard(&self, id: &str) -> Result<(), IntegrityError> {
        let mut games = self.lock()?;
        let entry = games
            .get_mut(id)
            .ok_or_else(|| IntegrityError::new(format!("Unknown game {}", id)))?;
        if entry.speculative.take().is_some() {
            debug!("Speculative state discarded");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(EngineConfig::default().with_seed(Some(11)))
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let sessions = manager();
        let v = sessions.create_game("g1").unwrap();
        assert_eq!(*v.counter(), 1);
        let err = sessions.create_game("g1").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Store(StoreError::AlreadyExists(_))
        ));
        assert_eq!(sessions.list_games().unwrap(), vec!["g1".to_string()]);
    }

    #[test]
    fn test_stale_save_conflicts() {
        let sessions = manager();
        let v1 = sessions.create_game("g1").unwrap();
        let game = sessions.game("g1").unwrap();
        let v2 = sessions.save("g1", &game, Some(v1)).unwrap();
        assert_eq!(*v2.counter(), 2);
        let err = sessions.save("g1", &game, Some(v1)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn test_cache_then_discard() {
        let sessions = manager();
        let v1 = sessions.create_game("g1").unwrap();
        let mut game = sessions.game("g1").unwrap();
        game.round = 99;
        sessions.cache("g1", &game, v1).unwrap();
        assert_eq!(*sessions.game("g1").unwrap().round(), 99);
        sessions.discard("g1").unwrap();
        assert_ne!(*sessions.game("g1").unwrap().round(), 99);
    }

    #[test]
    fn test_unknown_game_is_integrity_error() {
        let sessions = manager();
        assert!(sessions.load("missing").is_err());
        assert!(sessions.game("missing").is_err());
    }
}
