//! Phase consistency: the sub-machine only runs inside the Actions phase.

use super::super::game::Game;
use super::super::phase::{MultiAction, Phase};
use super::Invariant;

/// Invariant: phase, marker, turn and acting player agree.
///
/// - The multi-step marker is idle outside [`Phase::Actions`]
/// - The turn never passes the final turn
/// - A phase that waits on input has an acting player
/// - The area table has its fixed shape
pub struct PhaseConsistentInvariant;

impl Invariant<Game> for PhaseConsistentInvariant {
    fn holds(game: &Game) -> bool {
        if game.phase != Phase::Actions && game.multi_action != MultiAction::None {
            return false;
        }
        if game.turn > game.final_turn {
            return false;
        }
        if game.phase.accepts_input() && game.acting.is_none() {
            return false;
        }
        game.areas.is_well_formed()
    }

    fn description() -> &'static str {
        "Multi-step actions only run during Actions, and an input phase has an acting player"
    }
}
