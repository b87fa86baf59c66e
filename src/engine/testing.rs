//! Builders shared by the unit tests.

use super::game::Game;
use super::map::{AreaId, ArmyToken, City};
use super::player::PlayerId;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A fresh game, already in the first Actions phase.
pub(crate) fn new_game(seed: u64) -> Game {
    Game::new(
        ["Red", "Purple", "Green"].map(String::from),
        5,
        &mut StdRng::seed_from_u64(seed),
    )
}

/// The first player in turn order.
pub(crate) fn first(game: &Game) -> PlayerId {
    game.order[0]
}

/// Puts `count` of `player`'s armies in `area`, drawn from supply.
pub(crate) fn station(game: &mut Game, player: PlayerId, area: AreaId, count: u32) {
    game.player_mut(player).army_supply -= count;
    game.areas.get_mut(area).army = Some(ArmyToken {
        owner: player,
        count,
    });
}

/// Moves `count` of `player`'s workers from hand into `area`.
pub(crate) fn place(game: &mut Game, player: PlayerId, area: AreaId, count: u32) {
    let p = game.player_mut(player);
    p.worker_supply -= count.saturating_sub(p.workers);
    p.workers = p.workers.saturating_sub(count);
    game.areas.get_mut(area).workers[player.index()] += count;
}

/// Builds a city for `player` in `site`, using one token.
pub(crate) fn build(game: &mut Game, player: PlayerId, site: AreaId) {
    game.player_mut(player).cities -= 1;
    game.areas.get_mut(site).city = Some(City {
        owner: player,
        expanded: false,
    });
}
