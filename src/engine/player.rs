//! Per-player state.

use super::resources::Resources;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Number of players in every game.
pub const PLAYER_COUNT: usize = 3;

/// Stable player identifier, assigned at setup and never reused.
///
/// Always a seat in 0..=2: ids come from [`PlayerId::all`] or a checked
/// conversion, and snapshots holding any other seat fail to deserialize.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u8", into = "u8")]
#[display("P{}", _0)]
pub struct PlayerId(u8);

/// A seat index outside 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Seat {} does not exist", _0)]
pub struct UnknownSeat(#[error(not(source))] pub u8);

impl PlayerId {
    /// Index into per-player arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All three ids in seat order.
    pub fn all() -> [PlayerId; PLAYER_COUNT] {
        [PlayerId(0), PlayerId(1), PlayerId(2)]
    }

    /// Parses a seat index, rejecting anything outside 0..=2.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < PLAYER_COUNT).then_some(Self(index as u8))
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = UnknownSeat;

    fn try_from(seat: u8) -> Result<Self, Self::Error> {
        Self::from_index(seat as usize).ok_or(UnknownSeat(seat))
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

/// A player's mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) resources: Resources,
    /// City tokens not yet on the board.
    pub(crate) cities: u32,
    /// Expansion tokens not yet used.
    pub(crate) expansions: u32,
    pub(crate) workers: u32,
    pub(crate) worker_supply: u32,
    pub(crate) armies: u32,
    pub(crate) army_supply: u32,
    /// Resources spent on the turn-order bid.
    pub(crate) bid: Resources,
    pub(crate) score: u32,
    pub(crate) passed: bool,
    pub(crate) vp_passed: bool,
    pub(crate) performed_action: bool,
    pub(crate) paid_action_cost: bool,
    pub(crate) used_sippar: bool,
}

impl Player {
    /// City tokens each player starts with.
    pub const STARTING_CITIES: u32 = 4;
    /// Expansion tokens each player starts with.
    pub const STARTING_EXPANSIONS: u32 = 4;
    /// Workers dealt at setup.
    pub const STARTING_WORKERS: u32 = 2;
    /// Workers held in supply at setup.
    pub const STARTING_WORKER_SUPPLY: u32 = 21;
    /// Armies held in supply.
    pub const ARMY_SUPPLY: u32 = 20;

    /// A player as dealt at setup.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            resources: Resources::starting_hand(),
            cities: Self::STARTING_CITIES,
            expansions: Self::STARTING_EXPANSIONS,
            workers: Self::STARTING_WORKERS,
            worker_supply: Self::STARTING_WORKER_SUPPLY,
            armies: 0,
            army_supply: Self::ARMY_SUPPLY,
            bid: Resources::empty(),
            score: 0,
            passed: false,
            vp_passed: false,
            performed_action: false,
            paid_action_cost: false,
            used_sippar: false,
        }
    }

    /// Turn-order bid value.
    pub fn bid_value(&self) -> u32 {
        self.bid.bid_value()
    }

    /// Cities currently on the board.
    pub fn cities_built(&self) -> u32 {
        Self::STARTING_CITIES.saturating_sub(self.cities)
    }

    /// Clears the per-phase flags.
    pub(crate) fn reset_for_phase(&mut self) {
        self.performed_action = false;
        self.passed = false;
        self.vp_passed = false;
    }

    /// Clears the per-player-turn flags.
    pub(crate) fn reset_for_turn(&mut self) {
        self.performed_action = false;
        self.paid_action_cost = false;
        self.used_sippar = false;
    }

    /// Takes up to `count` armies from supply onto the player's hand; returns how many moved.
    pub(crate) fn draw_armies(&mut self, count: u32) -> u32 {
        let n = count.min(self.army_supply);
        self.army_supply -= n;
        self.armies += n;
        n
    }

    /// Returns up to `count` on-hand armies to supply; returns how many moved.
    pub(crate) fn return_armies(&mut self, count: u32) -> u32 {
        let n = count.min(self.armies);
        self.armies -= n;
        self.army_supply += n;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starting_state() {
        let p = Player::new(PlayerId::all()[1], "Purple");
        assert_eq!(*p.workers(), 2);
        assert_eq!(*p.worker_supply(), 21);
        assert_eq!(*p.army_supply(), 20);
        assert_eq!(p.cities_built(), 0);
        assert_eq!(p.resources().total(), 5);
    }

    #[test]
    fn test_draw_armies_caps_at_supply() {
        let mut p = Player::new(PlayerId::all()[0], "Red");
        p.army_supply = 3;
        assert_eq!(p.draw_armies(5), 3);
        assert_eq!(p.armies, 3);
        assert_eq!(p.army_supply, 0);
        assert_eq!(p.return_armies(1), 1);
        assert_eq!(p.army_supply, 1);
    }

    #[test]
    fn test_player_id_bounds() {
        assert_eq!(PlayerId::from_index(2), Some(PlayerId::all()[2]));
        assert_eq!(PlayerId::from_index(3), None);
        assert_eq!(PlayerId::all()[1].to_string(), "P1");
        assert_eq!(PlayerId::try_from(7), Err(UnknownSeat(7)));
    }

    #[test]
    fn test_out_of_range_seat_fails_to_deserialize() {
        assert_eq!(serde_json::from_str::<PlayerId>("2").unwrap(), PlayerId::all()[2]);
        let err = serde_json::from_str::<PlayerId>("7").unwrap_err();
        assert!(err.to_string().contains("Seat 7 does not exist"));
        assert_eq!(serde_json::to_string(&PlayerId::all()[1]).unwrap(), "1");
    }
}
