//! Contract-based validation for submissions.
//!
//! Preconditions are small unit structs with a `check` method, composed with
//! `?` in a fixed order. The postcondition re-checks the invariant set on the
//! state a handler produced before it is committed.

use super::action::Submission;
use super::error::{ActionError, EngineError, IntegrityError};
use super::game::Game;
use super::invariants::{FloodInvariants, InvariantSet};
use super::phase::{MultiAction, Phase};
use super::player::{PLAYER_COUNT, PlayerId};
use tracing::{debug, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), EngineError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), EngineError>;
}

// ─────────────────────────────────────────────────────────────
//  Shared Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game is in the given phase.
pub struct InPhase;

impl InPhase {
    /// Rejects with `WrongPhase` outside `phase`.
    #[instrument(skip(game))]
    pub fn check(game: &Game, phase: Phase) -> Result<(), ActionError> {
        if game.phase != phase {
            Err(ActionError::WrongPhase(game.phase))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the multi-step marker is one the action may start from.
pub struct StepAllowed;

impl StepAllowed {
    /// Rejects a marker outside `allowed`.
    #[instrument(skip(game))]
    pub fn check(game: &Game, allowed: &[MultiAction]) -> Result<(), ActionError> {
        let current = game.multi_action;
        if allowed.contains(&current) {
            Ok(())
        } else if current != MultiAction::None {
            Err(ActionError::ActionInProgress(current))
        } else {
            Err(ActionError::OutOfSequence(current))
        }
    }
}

/// Precondition: the submitter is the acting player.
pub struct IsActingPlayer;

impl IsActingPlayer {
    /// Rejects anyone but the acting player.
    #[instrument(skip(game))]
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        if game.is_acting(player) {
            Ok(())
        } else {
            Err(ActionError::NotCurrentPlayer)
        }
    }
}

/// Precondition: the submitter has not passed this round.
pub struct NotPassed;

impl NotPassed {
    /// Rejects a player who passed.
    #[instrument(skip(game))]
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        if game.player(player).passed {
            Err(ActionError::AlreadyPassed)
        } else {
            Ok(())
        }
    }
}

/// Precondition: once anyone has passed, the action cost must be paid first.
pub struct ActionCostPaid;

impl ActionCostPaid {
    /// Rejects an unpaid action after someone passed.
    #[instrument(skip(game))]
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        if game.any_passed() && !game.player(player).paid_action_cost {
            Err(ActionError::ActionCostUnpaid)
        } else {
            Ok(())
        }
    }
}

/// Precondition: no definitive action yet, unless continuing one of `continues`.
pub struct NotYetPerformed;

impl NotYetPerformed {
    /// Rejects a second definitive action.
    #[instrument(skip(game))]
    pub fn check(game: &Game, player: PlayerId, continues: &[MultiAction]) -> Result<(), ActionError> {
        if game.player(player).performed_action && !continues.contains(&game.multi_action) {
            Err(ActionError::AlreadyPerformed)
        } else {
            Ok(())
        }
    }
}

/// The shared preconditions one action needs, checked in a fixed order:
/// phase, marker, acting player, not passed, action cost, not yet performed.
#[derive(Debug, Clone, Copy)]
pub struct Preconditions {
    phase: Phase,
    steps: &'static [MultiAction],
    not_passed: bool,
    cost: bool,
    fresh: Option<&'static [MultiAction]>,
}

impl Preconditions {
    /// A top-level Actions-phase action starting from an idle marker.
    pub const fn action() -> Self {
        Self {
            phase: Phase::Actions,
            steps: &[MultiAction::None],
            not_passed: true,
            cost: true,
            fresh: Some(&[]),
        }
    }

    /// An ExpandCity-phase action by the acting player.
    pub const fn expansion() -> Self {
        Self {
            phase: Phase::ExpandCity,
            steps: &[MultiAction::None],
            not_passed: false,
            cost: false,
            fresh: None,
        }
    }

    /// Overrides the allowed markers.
    pub const fn steps(mut self, steps: &'static [MultiAction]) -> Self {
        self.steps = steps;
        self
    }

    /// Allows an already-performed player while one of `continues` is active.
    pub const fn continuing(mut self, continues: &'static [MultiAction]) -> Self {
        self.fresh = Some(continues);
        self
    }

    /// Skips the not-yet-performed check.
    pub const fn any_performed(mut self) -> Self {
        self.fresh = None;
        self
    }

    /// Skips the action-cost check.
    pub const fn no_cost(mut self) -> Self {
        self.cost = false;
        self
    }

    /// Runs every enabled check in order.
    pub fn check(&self, game: &Game, player: PlayerId) -> Result<(), ActionError> {
        InPhase::check(game, self.phase)?;
        StepAllowed::check(game, self.steps)?;
        IsActingPlayer::check(game, player)?;
        if self.not_passed {
            NotPassed::check(game, player)?;
        }
        if self.cost {
            ActionCostPaid::check(game, player)?;
        }
        if let Some(continues) = self.fresh {
            NotYetPerformed::check(game, player, continues)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Submission Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract wrapping every submission.
///
/// Preconditions:
/// - The game is not over
/// - The player id names a seat
/// - Administrative overrides come from an admin
///
/// Postconditions:
/// - Every game invariant holds
/// - No claimed empire changed hands
pub struct ActionContract;

impl Contract<Game, Submission> for ActionContract {
    fn pre(game: &Game, sub: &Submission) -> Result<(), EngineError> {
        if sub.player().index() >= PLAYER_COUNT {
            return Err(ActionError::BadParameter("player").into());
        }
        if sub.kind().is_admin() {
            if !*sub.admin() {
                return Err(ActionError::NotAdmin.into());
            }
            return Ok(());
        }
        if game.phase.is_terminal() {
            return Err(ActionError::GameOver.into());
        }
        Ok(())
    }

    fn post(before: &Game, after: &Game) -> Result<(), EngineError> {
        // A state an administrator already broke is not re-reported on every action.
        if FloodInvariants::check_all(before).is_ok() {
            FloodInvariants::check_all(after).map_err(|violations| {
                let descriptions = violations
                    .iter()
                    .map(|v| v.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!(%descriptions, "Postcondition failed");
                IntegrityError::new(format!("Postcondition failed: {}", descriptions))
            })?;
        }

        for (old, new) in before.empires.iter().zip(after.empires.iter()) {
            if old.owner.is_some() && old.owner != new.owner {
                return Err(IntegrityError::new(format!(
                    "The {} empire changed hands",
                    old.name()
                ))
                .into());
            }
        }
        debug!("Postconditions hold");
        Ok(())
    }
}
