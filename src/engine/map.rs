//! The fixed map: named areas, their categories, adjacency, and occupancy.

use super::player::PlayerId;
use super::resources::Resource;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Every named location on the board, plus the holding boxes and the
/// `Sumer` empire-founding pseudo-area.
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
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum AreaId {
    // Sumer city-sites
    /// Babylon.
    Babylon,
    /// Sippar.
    Sippar,
    /// Kish.
    Kish,
    /// Nippur.
    Nippur,
    /// Isin.
    Isin,
    /// Shuruppak.
    Shuruppak,
    /// Umma.
    Umma,
    /// Larsa.
    Larsa,
    /// Lagash.
    Lagash,
    /// Uruk.
    Uruk,
    /// Ur.
    Ur,
    /// Eridu.
    Eridu,

    // Non-Sumer trade regions
    /// Akkad.
    Akkad,
    /// The Zagros mountains.
    Zagros,
    /// Mari.
    Mari,
    /// Assyria.
    Assyria,
    /// Anatolia.
    Anatolia,
    /// Lebanon.
    Lebanon,
    /// Egypt.
    Egypt,
    /// Arabia.
    Arabia,
    /// Dilmun.
    Dilmun,
    /// Magan.
    Magan,
    /// Meluhha.
    Meluhha,
    /// Elam.
    Elam,

    // Holding boxes
    /// Workers on hand.
    WorkerStock,
    /// Scribes ready for use.
    Scribes,
    /// Scribes placed this player-turn.
    NewScribes,
    /// Scribes already used this game-turn.
    UsedScribes,
    /// Tool makers ready for use.
    ToolMakers,
    /// Tool makers already used this game-turn.
    UsedToolMakers,

    /// Empire-founding site standing for every Sumer city-site.
    Sumer,
}

/// Broad category of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaKind {
    /// A Sumer city-site: may hold a city and an army, never workers.
    SumerSite,
    /// A trade region: may hold workers and an army.
    NonSumer,
    /// An off-map box holding workers.
    WorkerBox,
    /// The empire-founding pseudo-area.
    EmpireSite,
}

impl AreaId {
    /// Number of area identifiers.
    pub const COUNT: usize = 31;

    /// Position in the area table.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category of this area.
    pub fn kind(self) -> AreaKind {
        use AreaId::*;
        match self {
            Babylon | Sippar | Kish | Nippur | Isin | Shuruppak | Umma | Larsa | Lagash
            | Uruk | Ur | Eridu => AreaKind::SumerSite,
            Akkad | Zagros | Mari | Assyria | Anatolia | Lebanon | Egypt | Arabia | Dilmun
            | Magan | Meluhha | Elam => AreaKind::NonSumer,
            WorkerStock | Scribes | NewScribes | UsedScribes | ToolMakers | UsedToolMakers => {
                AreaKind::WorkerBox
            }
            Sumer => AreaKind::EmpireSite,
        }
    }

    /// True for Sumer city-sites.
    pub fn is_sumer(self) -> bool {
        self.kind() == AreaKind::SumerSite
    }

    /// True for non-Sumer trade regions.
    pub fn is_non_sumer(self) -> bool {
        self.kind() == AreaKind::NonSumer
    }

    /// True for off-map worker boxes.
    pub fn is_worker_box(self) -> bool {
        self.kind() == AreaKind::WorkerBox
    }

    /// True for areas that can hold an army.
    pub fn is_map_area(self) -> bool {
        self.is_sumer() || self.is_non_sumer()
    }

    /// Resource received when trading in a non-Sumer region.
    pub fn product(self) -> Option<Resource> {
        use AreaId::*;
        match self {
            Akkad => Some(Resource::Tool),
            Zagros | Mari | Lebanon => Some(Resource::Wood),
            Assyria | Anatolia | Magan => Some(Resource::Metal),
            Egypt => Some(Resource::Gold),
            Arabia | Dilmun => Some(Resource::Oil),
            Meluhha | Elam => Some(Resource::Lapis),
            _ => None,
        }
    }

    /// End-game points for holding the most workers here.
    pub fn score(self) -> u32 {
        use AreaId::*;
        match self {
            Akkad | Zagros | Mari | Lebanon | Arabia => 2,
            Assyria | Anatolia | Dilmun | Elam => 3,
            Egypt | Magan => 4,
            Meluhha => 5,
            _ => 0,
        }
    }

    /// Cities here produce textile at the start of each turn.
    pub fn is_textile_site(self) -> bool {
        matches!(self, AreaId::Ur | AreaId::Uruk)
    }

    /// Area used to look up an empire: Sumer city-sites found Sumer-bound empires.
    pub fn empire_key(self) -> AreaId {
        if self.is_sumer() { AreaId::Sumer } else { self }
    }

    /// All Sumer city-sites.
    pub fn sumer_sites() -> impl Iterator<Item = AreaId> {
        AreaId::iter().filter(|a| a.is_sumer())
    }

    /// All areas that can hold an army.
    pub fn map_areas() -> impl Iterator<Item = AreaId> {
        AreaId::iter().filter(|a| a.is_map_area())
    }

    /// Areas scored for worker majority at game end.
    pub fn scoring_areas() -> impl Iterator<Item = AreaId> {
        AreaId::iter().filter(|a| a.score() > 0)
    }
}

const EDGES: &[(AreaId, AreaId)] = {
    use AreaId::*;
    &[
        // outer regions
        (Anatolia, Lebanon),
        (Anatolia, Assyria),
        (Anatolia, Mari),
        (Lebanon, Mari),
        (Lebanon, Egypt),
        (Lebanon, Arabia),
        (Egypt, Arabia),
        (Arabia, Mari),
        (Arabia, Dilmun),
        (Mari, Assyria),
        (Mari, Akkad),
        (Assyria, Akkad),
        (Assyria, Zagros),
        (Akkad, Zagros),
        (Zagros, Elam),
        (Elam, Magan),
        (Dilmun, Magan),
        (Magan, Meluhha),
        // borders into Sumer
        (Mari, Sippar),
        (Akkad, Sippar),
        (Akkad, Babylon),
        (Akkad, Kish),
        (Zagros, Kish),
        (Zagros, Nippur),
        (Elam, Isin),
        (Elam, Umma),
        (Elam, Lagash),
        (Arabia, Ur),
        (Arabia, Eridu),
        (Dilmun, Eridu),
        (Dilmun, Lagash),
        // within Sumer
        (Sippar, Babylon),
        (Babylon, Kish),
        (Babylon, Nippur),
        (Kish, Nippur),
        (Nippur, Isin),
        (Nippur, Shuruppak),
        (Isin, Shuruppak),
        (Isin, Umma),
        (Shuruppak, Umma),
        (Shuruppak, Larsa),
        (Shuruppak, Uruk),
        (Umma, Lagash),
        (Umma, Larsa),
        (Larsa, Uruk),
        (Lagash, Uruk),
        (Lagash, Ur),
        (Uruk, Ur),
        (Ur, Eridu),
    ]
};

/// True if two map areas share a border.
#[instrument]
pub fn adjacent(a: AreaId, b: AreaId) -> bool {
    EDGES
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Areas bordering `area`.
pub fn neighbors(area: AreaId) -> impl Iterator<Item = AreaId> {
    EDGES.iter().filter_map(move |&(x, y)| {
        if x == area {
            Some(y)
        } else if y == area {
            Some(x)
        } else {
            None
        }
    })
}

/// The army occupying an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyToken {
    /// Owning player.
    pub owner: PlayerId,
    /// Armies in the area.
    pub count: u32,
}

/// A city on a Sumer site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Owning player.
    pub owner: PlayerId,
    /// Whether the city has been expanded.
    pub expanded: bool,
}

/// Mutable state of one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Which area this is.
    pub id: AreaId,
    /// Workers per player, indexed by player id.
    pub workers: [u32; 3],
    /// Army occupant, if any.
    pub army: Option<ArmyToken>,
    /// City, if built (Sumer sites only).
    pub city: Option<City>,
    /// Units traded here during the current player turn.
    pub traded: u32,
}

impl Area {
    /// An empty area.
    pub fn new(id: AreaId) -> Self {
        Self {
            id,
            workers: [0; 3],
            army: None,
            city: None,
            traded: 0,
        }
    }

    /// Workers of `player` here.
    pub fn workers_of(&self, player: PlayerId) -> u32 {
        self.workers[player.index()]
    }

    /// Owner of the army here, if any.
    pub fn army_owner(&self) -> Option<PlayerId> {
        self.army.map(|a| a.owner)
    }

    /// Armies here, regardless of owner.
    pub fn army_count(&self) -> u32 {
        self.army.map(|a| a.count).unwrap_or(0)
    }

    /// Armies of `player` here.
    pub fn armies_of(&self, player: PlayerId) -> u32 {
        match self.army {
            Some(a) if a.owner == player => a.count,
            _ => 0,
        }
    }

    /// Owner of the city here, if any.
    pub fn city_owner(&self) -> Option<PlayerId> {
        self.city.map(|c| c.owner)
    }

    /// True if `player` holds a strict majority of workers here (ties disqualify).
    pub fn has_most_workers(&self, player: PlayerId) -> bool {
        let mine = self.workers_of(player);
        mine > 0
            && self
                .workers
                .iter()
                .enumerate()
                .all(|(i, &n)| i == player.index() || n < mine)
    }
}

/// The full table of areas, indexed by [`AreaId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Areas(Vec<Area>);

impl Areas {
    /// Builds the board in its starting state.
    #[instrument]
    pub fn new() -> Self {
        Self(AreaId::iter().map(Area::new).collect())
    }

    /// Area by id.
    pub fn get(&self, id: AreaId) -> &Area {
        &self.0[id.index()]
    }

    /// Mutable area by id.
    pub fn get_mut(&mut self, id: AreaId) -> &mut Area {
        &mut self.0[id.index()]
    }

    /// Every area in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.0.iter()
    }

    /// Every area in id order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Area> {
        self.0.iter_mut()
    }

    /// True if the table has the expected shape.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == AreaId::COUNT
            && self.0.iter().enumerate().all(|(i, a)| a.id.index() == i)
    }

    /// True if `player` has any army on the board.
    pub fn has_armies_on_board(&self, player: PlayerId) -> bool {
        self.0.iter().any(|a| a.armies_of(player) > 0)
    }

    /// True if `player` has an army adjacent to `target`.
    pub fn has_army_adjacent_to(&self, player: PlayerId, target: AreaId) -> bool {
        neighbors(target).any(|n| self.get(n).armies_of(player) > 0)
    }

    /// True if `player` owns the city in `site`.
    pub fn owns_city(&self, player: PlayerId, site: AreaId) -> bool {
        self.get(site).city_owner() == Some(player)
    }

    /// Cities owned by `player`.
    pub fn cities_of(&self, player: PlayerId) -> impl Iterator<Item = &Area> {
        self.0.iter().filter(move |a| a.city_owner() == Some(player))
    }

    /// Scribes of `player` across the scribe boxes.
    pub fn scribes_of(&self, player: PlayerId) -> u32 {
        [AreaId::Scribes, AreaId::NewScribes, AreaId::UsedScribes]
            .iter()
            .map(|&id| self.get(id).workers_of(player))
            .sum()
    }
}

impl Default for Areas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_count_matches_enum() {
        assert_eq!(AreaId::iter().count(), AreaId::COUNT);
        assert!(Areas::new().is_well_formed());
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        assert!(adjacent(AreaId::Akkad, AreaId::Babylon));
        assert!(adjacent(AreaId::Babylon, AreaId::Akkad));
        assert!(!adjacent(AreaId::Egypt, AreaId::Elam));
    }

    #[test]
    fn test_edges_only_join_map_areas() {
        for &(a, b) in EDGES {
            assert!(a.is_map_area() && b.is_map_area(), "{a} - {b}");
        }
    }

    #[test]
    fn test_every_map_area_has_a_neighbor() {
        for id in AreaId::map_areas() {
            assert!(neighbors(id).next().is_some(), "{id} is isolated");
        }
    }

    #[test]
    fn test_has_most_workers_requires_strict_majority() {
        let mut area = Area::new(AreaId::Egypt);
        area.workers = [2, 2, 1];
        assert!(!area.has_most_workers(PlayerId::all()[0]));
        area.workers = [3, 2, 1];
        assert!(area.has_most_workers(PlayerId::all()[0]));
        assert!(!area.has_most_workers(PlayerId::all()[1]));
        area.workers = [0, 0, 0];
        assert!(!area.has_most_workers(PlayerId::all()[2]));
    }

    #[test]
    fn test_empire_key_maps_sumer_sites() {
        assert_eq!(AreaId::Ur.empire_key(), AreaId::Sumer);
        assert_eq!(AreaId::Egypt.empire_key(), AreaId::Egypt);
    }

    #[test]
    fn test_scoring_areas_are_non_sumer() {
        assert!(AreaId::scoring_areas().all(|a| a.is_non_sumer()));
        assert_eq!(AreaId::scoring_areas().count(), 12);
    }
}
