//! Flood Engine - rules engine for a three-player game of Mesopotamian empires
//!
//! The engine validates and applies one player action at a time against a
//! single game aggregate, runs the automatic phases in between, and tells the
//! host what to persist.
//!
//! # Architecture
//!
//! - **Engine**: game state, legality, handlers, turn flow and scoring
//! - **Config**: TOML settings with `FLOOD_SEED` override
//! - **Session**: in-memory store with versioned saves and an undo cache
//! - **Replay**: TOML scripts of submissions run through a session
//!
//! # Example
//!
//! ```no_run
//! use flood_engine::{ActionKind, EngineConfig, Params, SessionManager, Submission};
//!
//! # fn example() -> anyhow::Result<()> {
//! let sessions = SessionManager::new(EngineConfig::default().with_seed(Some(7)));
//! sessions.create_game("g1")?;
//! let game = sessions.game("g1")?;
//! let me = game.acting().ok_or_else(|| anyhow::anyhow!("no acting player"))?;
//! let outcome = sessions.submit("g1", &Submission::new(ActionKind::FinishTurn, me, Params::none()));
//! assert!(outcome.is_err());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod engine;
mod replay;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, EngineConfig, SEED_ENV};

// Crate-level exports - Engine
pub use engine::{
    ActionError, ActionKind, AdminOverride, Applied, AreaId, Areas, BASE_WORKER_INCOME,
    CombatKind, Dice, Directive, Empire, EmpireName, EmpireTable, EngineError, Game,
    IntegrityError, LogEntry, LogRecord, MultiAction, Outcome, PLAYER_COUNT, PairOutcome,
    PairResult, Params, Payment, Phase, Player, PlayerId, PlayerOverride, Resource, Resources,
    Roll, ScriptedDice, SeededDice, Submission, UnknownSeat, View, WorkerOrigin,
};

// Crate-level exports - Replay
pub use replay::{ReplayReport, Script, Step};

// Crate-level exports - Session management
pub use session::{
    GameId, GameStore, SessionError, SessionManager, StatsSink, StoreError, Stored,
    TurnNotifier, UndoCache, Version,
};
