//! Resource conservation for the limited kinds.

use super::super::game::Game;
use super::super::resources::{Resource, Resources};
use super::Invariant;
use strum::IntoEnumIterator;

/// Invariant: every unit of a limited resource is in the bank, a hand, a bid
/// box or an equipment box, and the total never changes.
///
/// Grain and textile are produced from nothing at collection and are skipped.
pub struct ResourceConservationInvariant;

impl ResourceConservationInvariant {
    /// Units of each kind in circulation at setup.
    pub fn circulating() -> Resources {
        let mut total = Resources::initial_bank();
        for _ in 0..3 {
            total.deposit(&Resources::starting_hand());
        }
        total
    }

    fn counted(game: &Game) -> Resources {
        let mut total = game.bank;
        for p in &game.players {
            total.deposit(&p.resources);
            total.deposit(&p.bid);
        }
        for e in game.empires.iter() {
            total.deposit(&e.equipment);
        }
        total
    }
}

impl Invariant<Game> for ResourceConservationInvariant {
    fn holds(game: &Game) -> bool {
        let expected = Self::circulating();
        let counted = Self::counted(game);
        Resource::iter()
            .filter(|r| !r.is_unlimited())
            .all(|r| counted.get(r) == expected.get(r))
    }

    fn description() -> &'static str {
        "Limited resources in the bank, hands, bids and equipment keep their starting total"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::new_game;

    #[test]
    fn test_transfers_hold() {
        let mut game = new_game(6);
        let p = game.order[0];
        let paid = Resources::single(Resource::Gold, 1);
        let mut hand = game.player(p).resources;
        hand.transfer_to(&mut game.bank, &paid).unwrap();
        game.player_mut(p).resources = hand;
        assert!(ResourceConservationInvariant::holds(&game));
    }

    #[test]
    fn test_grain_is_not_counted() {
        let mut game = new_game(6);
        game.bank.add(Resource::Grain, 3);
        assert!(ResourceConservationInvariant::holds(&game));
        game.bank.add(Resource::Lapis, 1);
        assert!(!ResourceConservationInvariant::holds(&game));
    }
}
