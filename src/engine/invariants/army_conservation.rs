//! Army conservation: armies move between supply, hand and board, never vanish.

use super::super::game::Game;
use super::super::player::Player;
use super::Invariant;

/// Invariant: each player's armies on hand, in supply and on the board add up
/// to [`Player::ARMY_SUPPLY`].
pub struct ArmyConservationInvariant;

impl Invariant<Game> for ArmyConservationInvariant {
    fn holds(game: &Game) -> bool {
        game.players.iter().all(|p| {
            let on_board: u32 = game.areas.iter().map(|a| a.armies_of(p.id)).sum();
            p.armies + p.army_supply + on_board == Player::ARMY_SUPPLY
        })
    }

    fn description() -> &'static str {
        "Each player's armies on hand, in supply and on the board total 20"
    }
}
