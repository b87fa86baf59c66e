//! The rules engine.
//!
//! # Architecture
//!
//! - **State**: [`Game`] owns players, the board, the empire table and the log
//! - **Legality**: one `CanX` predicate per action, built on shared preconditions
//! - **Handlers**: apply a legal action to a working copy of the game
//! - **Flow**: the phase state machine that runs between player inputs
//! - **Rules**: pure turn-resolution functions (bidding, combat, scoring)
//! - **Invariants**: conservation checks run after every action

pub mod action;
pub mod contracts;
pub mod dice;
pub mod dispatch;
pub mod empire;
pub mod error;
mod flow;
pub mod game;
mod handlers;
pub mod invariants;
pub mod legality;
pub mod log;
pub mod map;
pub mod phase;
pub mod player;
pub mod resources;
pub mod rules;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    ActionKind, AdminOverride, Directive, Outcome, Params, Payment, PlayerOverride, Submission,
    View,
};
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use empire::{Empire, EmpireName, EmpireTable};
pub use error::{ActionError, EngineError, IntegrityError};
pub use flow::BASE_WORKER_INCOME;
pub use game::{Applied, Game, WorkerOrigin};
pub use log::{CombatKind, LogEntry, LogRecord, Roll};
pub use map::{AreaId, Areas};
pub use phase::{MultiAction, Phase};
pub use player::{PLAYER_COUNT, Player, PlayerId, UnknownSeat};
pub use resources::{Resource, Resources};
pub use rules::{PairOutcome, PairResult};
