//! The empire table: fifteen empires, three per turn.

use super::map::AreaId;
use super::player::PlayerId;
use super::resources::Resources;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Empire names. Egypt and Sumer appear on more than one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[allow(missing_docs)]
pub enum EmpireName {
    Akkad,
    Guti,
    Sumer,
    Amorites,
    Isin,
    Larsa,
    Mittani,
    Egypt,
    Hittites,
    Kassites,
    Elam,
    Assyria,
    Chaldea,
}

/// One row of the empire table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Empire {
    name: EmpireName,
    /// Turn during which the empire can be founded.
    turn: u8,
    /// Area bound to the empire.
    area: AreaId,
    /// Armies received on founding.
    armies: u32,
    /// Strength rating used in combat.
    rating: u32,
    pub(crate) owner: Option<PlayerId>,
    /// Metal and tools committed by `equip-army`, returned to the bank at end of turn.
    pub(crate) equipment: Resources,
    pub(crate) declined: bool,
}

impl Empire {
    fn row(turn: u8, name: EmpireName, area: AreaId, armies: u32, rating: u32) -> Self {
        Self {
            name,
            turn,
            area,
            armies,
            rating,
            owner: None,
            equipment: Resources::empty(),
            declined: false,
        }
    }
}

/// Index of an empire in the [`EmpireTable`].
pub type EmpireIndex = usize;

/// The fixed empire table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmpireTable(Vec<Empire>);

impl EmpireTable {
    /// The table at game start, every empire unclaimed.
    #[instrument]
    pub fn new() -> Self {
        use AreaId as A;
        use EmpireName as E;
        Self(vec![
            Empire::row(1, E::Akkad, A::Akkad, 5, 3),
            Empire::row(1, E::Guti, A::Zagros, 4, 2),
            Empire::row(1, E::Sumer, A::Sumer, 6, 1),
            Empire::row(2, E::Amorites, A::Mari, 6, 3),
            Empire::row(2, E::Isin, A::Sumer, 5, 2),
            Empire::row(2, E::Larsa, A::Sumer, 5, 2),
            Empire::row(3, E::Mittani, A::Assyria, 6, 3),
            Empire::row(3, E::Egypt, A::Egypt, 7, 4),
            Empire::row(3, E::Sumer, A::Sumer, 6, 2),
            Empire::row(4, E::Hittites, A::Anatolia, 7, 5),
            Empire::row(4, E::Kassites, A::Zagros, 6, 3),
            Empire::row(4, E::Egypt, A::Egypt, 7, 4),
            Empire::row(5, E::Elam, A::Elam, 7, 4),
            Empire::row(5, E::Assyria, A::Assyria, 8, 5),
            Empire::row(5, E::Chaldea, A::Sumer, 7, 3),
        ])
    }

    /// Empire by index.
    pub fn get(&self, index: EmpireIndex) -> Option<&Empire> {
        self.0.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: EmpireIndex) -> Option<&mut Empire> {
        self.0.get_mut(index)
    }

    /// Every row in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Empire> {
        self.0.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Empire> {
        self.0.iter_mut()
    }

    /// Indices of the empires available on `turn`.
    pub fn for_turn(&self, turn: u8) -> impl Iterator<Item = EmpireIndex> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.turn == turn)
            .map(|(i, _)| i)
    }

    /// First current-turn empire bound to `area` (after Sumer folding), owned or not.
    pub fn matching(&self, turn: u8, area: AreaId) -> Option<EmpireIndex> {
        let key = area.empire_key();
        self.for_turn(turn).find(|&i| self.0[i].area == key)
    }

    /// First unowned current-turn empire bound to `area`.
    pub fn available(&self, turn: u8, area: AreaId) -> Option<EmpireIndex> {
        let key = area.empire_key();
        self.for_turn(turn)
            .find(|&i| self.0[i].area == key && self.0[i].owner.is_none())
    }

    /// The empire `player` founded on `turn`, if any.
    pub fn owned_by(&self, turn: u8, player: PlayerId) -> Option<EmpireIndex> {
        self.for_turn(turn).find(|&i| self.0[i].owner == Some(player))
    }

    /// The most recent empire `player` founded whose bound area covers `area`.
    ///
    /// Only a fallback for a defender with no empire this turn; declined
    /// empires can match.
    pub fn controlling(&self, player: PlayerId, area: AreaId) -> Option<&Empire> {
        let key = area.empire_key();
        self.0
            .iter()
            .rev()
            .find(|e| e.owner == Some(player) && e.area == key)
            .or_else(|| self.0.iter().rev().find(|e| e.owner == Some(player)))
    }
}

impl Default for EmpireTable {
    fn default() -> Self {
        Self::new()
    }
}
