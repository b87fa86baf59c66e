//! Worker conservation across hand, supply, trade regions and worker boxes.

use super::super::game::Game;
use super::super::player::Player;
use super::Invariant;

/// Workers each player owns for the whole game.
pub const WORKERS_PER_PLAYER: u32 = Player::STARTING_WORKERS + Player::STARTING_WORKER_SUPPLY;

/// Invariant: every player always owns exactly [`WORKERS_PER_PLAYER`] workers.
pub struct WorkerConservationInvariant;

impl Invariant<Game> for WorkerConservationInvariant {
    fn holds(game: &Game) -> bool {
        game.players.iter().all(|p| {
            let placed: u32 = game.areas.iter().map(|a| a.workers_of(p.id)).sum();
            p.workers + p.worker_supply + placed == WORKERS_PER_PLAYER
        })
    }

    fn description() -> &'static str {
        "Each player's workers on hand, in supply and placed total 23"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::map::AreaId;
    use crate::engine::testing::new_game;

    #[test]
    fn test_placed_workers_hold() {
        let mut game = new_game(4);
        let p = game.order[1];
        game.player_mut(p).workers -= 2;
        game.areas.get_mut(AreaId::Scribes).workers[p.index()] += 2;
        assert!(WorkerConservationInvariant::holds(&game));
    }

    #[test]
    fn test_lost_worker_violates() {
        let mut game = new_game(4);
        let p = game.order[1];
        game.player_mut(p).worker_supply -= 1;
        assert!(!WorkerConservationInvariant::holds(&game));
    }
}
