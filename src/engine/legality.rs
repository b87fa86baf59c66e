//! One predicate per discretionary action.
//!
//! Each `CanX::check` runs the shared preconditions, then the action's own
//! checks, and returns a validated plan for the handler to apply. Checks
//! never mutate the game; the first failing check names the reason.

use super::action::{Params, Payment};
use super::contracts::{InPhase, IsActingPlayer, Preconditions};
use super::empire::EmpireIndex;
use super::error::ActionError;
use super::game::{Game, WorkerOrigin};
use super::map::AreaId;
use super::phase::{MultiAction, Phase};
use super::player::PlayerId;
use super::resources::{Resource, Resources};
use super::rules::expansion_points;
use tracing::{debug, instrument};

/// Most scribes a player may hold across the scribe boxes.
pub const MAX_SCRIBES: u32 = 2;
/// Extra armies for founding an empire while holding the Babylon city.
pub const BABYLON_BONUS: u32 = 2;
/// Armies spent to destroy a city.
pub const DESTRUCTION_COST: u32 = 2;
/// Destruction cost while the defender holds Shuruppak with two or fewer city tokens.
pub const SHURUPPAK_DESTRUCTION_COST: u32 = 3;

const EXPANDING: Preconditions = Preconditions::action()
    .steps(&[MultiAction::None, MultiAction::ExpandEmpire])
    .continuing(&[MultiAction::ExpandEmpire]);

// ─────────────────────────────────────────────────────────────
//  Helpers
// ─────────────────────────────────────────────────────────────

/// Armies the next expansion step costs: 1 while expanding, 0 for the first
/// step and after a won battle.
pub fn expansion_cost(game: &Game) -> u32 {
    if game.continue_expansion {
        0
    } else if game.multi_action == MultiAction::ExpandEmpire {
        1
    } else {
        0
    }
}

/// Armies needed to destroy the city in `site`.
pub fn destruction_cost(game: &Game, site: AreaId) -> u32 {
    match game.areas.get(site).city_owner() {
        Some(owner)
            if game.player(owner).cities <= 2 && game.areas.owns_city(owner, AreaId::Shuruppak) =>
        {
            SHURUPPAK_DESTRUCTION_COST
        }
        _ => DESTRUCTION_COST,
    }
}

/// Traders `player` has in `area` before subtracting units already traded.
pub fn traders_in(game: &Game, player: PlayerId, area: AreaId) -> u32 {
    let base = base_traders(game, player, area);
    if base > 0 && sippar_available(game, player) {
        base + 1
    } else {
        base
    }
}

fn base_traders(game: &Game, player: PlayerId, area: AreaId) -> u32 {
    let a = game.areas.get(area);
    match a.army_owner() {
        None => a.workers_of(player),
        Some(owner) if owner == player => a.armies_of(player),
        Some(_) => 0,
    }
}

fn sippar_available(game: &Game, player: PlayerId) -> bool {
    game.areas.owns_city(player, AreaId::Sippar) && !game.player(player).used_sippar
}

fn holds(have: &Resources, need: &Resources) -> Result<(), ActionError> {
    match need.nonzero().find(|&(r, n)| have.get(r) < n) {
        Some((r, n)) => Err(ActionError::Insufficient(n, r)),
        None => Ok(()),
    }
}

fn holds_one(have: &Resources, resource: Resource) -> Result<(), ActionError> {
    holds(have, &Resources::single(resource, 1))
}

/// Destinations that accept placed workers.
fn accepts_workers(area: AreaId) -> Result<(), ActionError> {
    if area.is_sumer() {
        Err(ActionError::WorkersInSumer)
    } else if area.is_non_sumer() || matches!(area, AreaId::Scribes | AreaId::ToolMakers) {
        Ok(())
    } else {
        Err(ActionError::ClosedBox(area))
    }
}

fn map_area(area: AreaId) -> Result<(), ActionError> {
    if area.is_map_area() {
        Ok(())
    } else {
        Err(ActionError::NotMapArea(area))
    }
}

fn sumer_site(area: AreaId) -> Result<(), ActionError> {
    if area.is_sumer() {
        Ok(())
    } else {
        Err(ActionError::NotSumerSite(area))
    }
}

fn has_empire(game: &Game, player: PlayerId) -> Result<(), ActionError> {
    game.empire_of(player).map(|_| ()).ok_or(ActionError::NoEmpire)
}

fn enough_armies(game: &Game, player: PlayerId, need: u32) -> Result<(), ActionError> {
    let have = game.player(player).armies;
    if have < need {
        Err(ActionError::NotEnoughArmies(need, have))
    } else {
        Ok(())
    }
}

/// Own army adjacent, or no armies on the board and the target in the empire area.
fn can_reach(game: &Game, player: PlayerId, area: AreaId) -> Result<(), ActionError> {
    if game.areas.has_army_adjacent_to(player, area)
        || (!game.areas.has_armies_on_board(player) && game.in_empire_area(player, area))
    {
        Ok(())
    } else {
        Err(ActionError::NotAdjacent(area))
    }
}

fn occupied_by_rival(game: &Game, player: PlayerId, area: AreaId) -> Option<PlayerId> {
    game.areas.get(area).army_owner().filter(|&o| o != player)
}

// ─────────────────────────────────────────────────────────────
//  Workers, Scribes, Tool Makers
// ─────────────────────────────────────────────────────────────

/// A validated worker placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPlacement {
    /// Destination as chosen.
    pub area: AreaId,
    /// Resource spent.
    pub spent: Resource,
    /// Workers placed.
    pub count: u32,
}

/// Predicate for `place-workers`.
pub struct CanPlaceWorkers;

impl CanPlaceWorkers {
    const PRE: Preconditions = Preconditions::action()
        .steps(&[MultiAction::None, MultiAction::PlacedWorker])
        .continuing(&[MultiAction::PlacedWorker]);

    /// Spend one resource to place up to its value in workers.
    #[instrument(skip(game, params), fields(player = %player, area = ?params.area()))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<WorkerPlacement, ActionError> {
        Self::PRE.check(game, player)?;
        if game.placed_workers {
            return Err(ActionError::AlreadyPlacedWorkers);
        }
        let area = params.require_area()?;
        accepts_workers(area)?;

        let p = game.player(player);
        if p.workers == 0 {
            return Err(ActionError::NoWorkers(area));
        }
        let spent = match *params.resource() {
            Some(r) => r,
            None => match params.resources().nonzero().collect::<Vec<_>>().as_slice() {
                [(r, 1)] => *r,
                _ => return Err(ActionError::OneResource),
            },
        };
        holds_one(&p.resources, spent)?;

        let max = spent.value().min(p.workers);
        let count = params.require_count()?;
        if count == 0 || count > max {
            return Err(ActionError::WorkerCount(max));
        }
        if area == AreaId::Scribes && game.areas.scribes_of(player) + count > MAX_SCRIBES {
            return Err(ActionError::ScribeLimit);
        }
        debug!(%spent, count, "Worker placement permitted");
        Ok(WorkerPlacement { area, spent, count })
    }
}

/// Predicate for `use-scribe`.
pub struct CanUseScribe;

impl CanUseScribe {
    const PRE: Preconditions = Preconditions::action()
        .steps(&[MultiAction::None, MultiAction::PlacedWorker])
        .any_performed();

    /// A ready scribe is required.
    #[instrument(skip(game), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        Self::PRE.check(game, player)?;
        if game.areas.get(AreaId::Scribes).workers_of(player) == 0 {
            return Err(ActionError::NoScribe);
        }
        Ok(())
    }
}

/// Predicate for picking the worker a scribe moves (`select-area`, `from-stock`).
pub struct CanSelectWorker;

impl CanSelectWorker {
    /// `None` picks from the player's hand.
    #[instrument(skip(game), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, area: Option<AreaId>) -> Result<WorkerOrigin, ActionError> {
        InPhase::check(game, Phase::Actions)?;
        IsActingPlayer::check(game, player)?;
        if game.multi_action != MultiAction::UsedScribe {
            return Err(ActionError::OutOfSequence(game.multi_action));
        }
        match area {
            None | Some(AreaId::WorkerStock) => {
                if game.player(player).workers == 0 {
                    Err(ActionError::NoWorkers(AreaId::WorkerStock))
                } else {
                    Ok(WorkerOrigin::Stock)
                }
            }
            Some(a @ (AreaId::UsedScribes | AreaId::NewScribes | AreaId::UsedToolMakers | AreaId::Sumer)) => {
                Err(ActionError::NoWorkerIn(a))
            }
            Some(a) if game.areas.get(a).workers_of(player) == 0 => Err(ActionError::NoWorkerIn(a)),
            Some(a) => Ok(WorkerOrigin::Area(a)),
        }
    }
}

/// Predicate for the destination of a scribe-moved worker.
pub struct CanPlaceScribedWorker;

impl CanPlaceScribedWorker {
    /// Returns the worker's origin.
    #[instrument(skip(game), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<WorkerOrigin, ActionError> {
        InPhase::check(game, Phase::Actions)?;
        IsActingPlayer::check(game, player)?;
        if game.multi_action != MultiAction::SelectedWorker {
            return Err(ActionError::OutOfSequence(game.multi_action));
        }
        let origin = game.scribe_from.ok_or(ActionError::NoWorkerIn(AreaId::WorkerStock))?;
        accepts_workers(area)?;
        if origin == WorkerOrigin::Area(area) {
            return Err(ActionError::SameArea);
        }
        let from_scribes = matches!(origin, WorkerOrigin::Area(AreaId::Scribes));
        if area == AreaId::Scribes && !from_scribes && game.areas.scribes_of(player) + 1 > MAX_SCRIBES {
            return Err(ActionError::ScribeLimit);
        }
        Ok(origin)
    }
}

/// Predicate for `make-tool`.
pub struct CanMakeTool;

impl CanMakeTool {
    const PRE: Preconditions = Preconditions::action()
        .steps(&[MultiAction::None, MultiAction::TradedResource])
        .continuing(&[MultiAction::TradedResource]);

    /// A ready tool maker turns one metal into one tool.
    #[instrument(skip(game), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        Self::PRE.check(game, player)?;
        if game.areas.get(AreaId::ToolMakers).workers_of(player) == 0 {
            return Err(ActionError::NoToolMaker);
        }
        holds_one(&game.player(player).resources, Resource::Metal)?;
        if game.bank.get(Resource::Tool) == 0 {
            return Err(ActionError::BankEmpty(Resource::Tool));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Trade
// ─────────────────────────────────────────────────────────────

/// A validated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradePlan {
    /// Where the trade happens.
    pub area: AreaId,
    /// Resource handed to the bank.
    pub gave: Resource,
    /// Product received.
    pub got: Resource,
    /// The trade uses the Sippar trader.
    pub uses_sippar: bool,
}

/// Predicate for `trade-resource`.
pub struct CanTrade;

impl CanTrade {
    const PRE: Preconditions = Preconditions::action()
        .steps(&[MultiAction::None, MultiAction::TradedResource])
        .continuing(&[MultiAction::TradedResource]);

    /// One available trader, a resource to give, and the product in stock.
    #[instrument(skip(game, params), fields(player = %player, area = ?params.area()))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<TradePlan, ActionError> {
        Self::PRE.check(game, player)?;
        let area = params.require_area()?;
        let got = area.product().ok_or(ActionError::NoTrade(area))?;

        let traded = game.areas.get(area).traded;
        let available = traders_in(game, player, area).saturating_sub(traded);
        if available == 0 {
            return Err(ActionError::NoTraders(area));
        }
        let gave = params.require_resource()?;
        holds_one(&game.player(player).resources, gave)?;
        if !got.is_unlimited() && game.bank.get(got) == 0 {
            return Err(ActionError::BankEmpty(got));
        }
        let uses_sippar = traded + 1 > base_traders(game, player, area);
        debug!(available, uses_sippar, "Trade permitted");
        Ok(TradePlan {
            area,
            gave,
            got,
            uses_sippar,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Empires
// ─────────────────────────────────────────────────────────────

/// A validated empire founding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Founding {
    /// Site chosen.
    pub area: AreaId,
    /// Row in the empire table.
    pub empire: EmpireIndex,
    /// Armies granted by the empire.
    pub armies: u32,
    /// Extra armies from the Babylon city.
    pub bonus: u32,
}

/// Predicate for `start-empire`.
pub struct CanStartEmpire;

impl CanStartEmpire {
    /// An unclaimed current-turn empire bound to the area, and the strict
    /// worker majority there (waived on Sumer sites).
    #[instrument(skip(game, params), fields(player = %player, area = ?params.area()))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<Founding, ActionError> {
        Preconditions::action().check(game, player)?;
        let area = params.require_area()?;
        map_area(area)?;
        if game.empire_of(player).is_some() {
            return Err(ActionError::AlreadyHasEmpire);
        }
        let matching = game
            .empires
            .matching(game.turn, area)
            .ok_or(ActionError::NoEmpireFor(area))?;
        let empire = game.empires.available(game.turn, area).ok_or_else(|| {
            let name = game.empires.get(matching).map(|e| *e.name());
            name.map(ActionError::EmpireTaken)
                .unwrap_or(ActionError::NoEmpireFor(area))
        })?;
        if !area.is_sumer() && !game.areas.get(area).has_most_workers(player) {
            return Err(ActionError::NotMostWorkers(area));
        }
        let armies = game.empires.get(empire).map(|e| *e.armies()).unwrap_or(0);
        let bonus = if game.areas.owns_city(player, AreaId::Babylon) {
            BABYLON_BONUS
        } else {
            0
        };
        Ok(Founding {
            area,
            empire,
            armies,
            bonus,
        })
    }
}

/// Predicate for `buy-armies`.
pub struct CanBuyArmies;

impl CanBuyArmies {
    /// Grain, metal and tools only. Returns the armies bought.
    #[instrument(skip(game, spent), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, spent: &Resources) -> Result<u32, ActionError> {
        Preconditions::action()
            .steps(&[MultiAction::StartedEmpire])
            .check(game, player)?;
        holds(&game.player(player).resources, spent)?;
        let mut armies: u32 = 0;
        for (r, n) in spent.nonzero() {
            let value = r.army_value().ok_or(ActionError::CannotBuyArmies(r))?;
            armies = value
                .checked_mul(n)
                .and_then(|bought| armies.checked_add(bought))
                .ok_or(ActionError::BadParameter("resources"))?;
        }
        Ok(armies.min(game.player(player).army_supply))
    }
}

/// Predicate for `equip-army`.
pub struct CanEquipArmy;

impl CanEquipArmy {
    /// Metal and tools only.
    #[instrument(skip(game, spent), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, spent: &Resources) -> Result<EmpireIndex, ActionError> {
        Preconditions::action()
            .steps(&[MultiAction::BoughtArmies])
            .check(game, player)?;
        if let Some((r, _)) = spent
            .nonzero()
            .find(|(r, _)| !matches!(r, Resource::Metal | Resource::Tool))
        {
            return Err(ActionError::CannotEquip(r));
        }
        holds(&game.player(player).resources, spent)?;
        game.empires
            .owned_by(game.turn, player)
            .ok_or(ActionError::NoEmpire)
    }
}

/// Predicate for `place-armies`.
pub struct CanPlaceArmies;

impl CanPlaceArmies {
    /// One or two armies into an unoccupied area of the player's empire.
    #[instrument(skip(game, params), fields(player = %player, area = ?params.area()))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<(AreaId, u32), ActionError> {
        Preconditions::action()
            .steps(&[MultiAction::EquippedArmy])
            .check(game, player)?;
        let area = params.area().or(game.founding_area).ok_or(ActionError::MissingArea)?;
        if !game.in_empire_area(player, area) {
            return Err(ActionError::NotEmpireArea(area));
        }
        let count = params.require_count()?;
        if !(1..=2).contains(&count) {
            return Err(ActionError::ArmyCount(count));
        }
        enough_armies(game, player, count)?;
        if occupied_by_rival(game, player, area).is_some() {
            return Err(ActionError::Occupied(area));
        }
        Ok((area, count))
    }
}

/// Predicate for `confirm-start-empire`.
pub struct CanConfirmStartEmpire;

impl CanConfirmStartEmpire {
    /// Returns the contested area and its defender.
    #[instrument(skip(game, params), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<(AreaId, PlayerId), ActionError> {
        Preconditions::action()
            .steps(&[MultiAction::EquippedArmy])
            .check(game, player)?;
        let area = params.area().or(game.founding_area).ok_or(ActionError::MissingArea)?;
        if !game.in_empire_area(player, area) {
            return Err(ActionError::NotEmpireArea(area));
        }
        let defender = occupied_by_rival(game, player, area).ok_or(ActionError::NotOccupied(area))?;
        enough_armies(game, player, 1)?;
        Ok((area, defender))
    }
}

/// Predicate for `cancel-start-empire`.
pub struct CanCancelStartEmpire;

impl CanCancelStartEmpire {
    /// Only while founding is still in progress.
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        Preconditions::action()
            .steps(&[
                MultiAction::StartedEmpire,
                MultiAction::BoughtArmies,
                MultiAction::EquippedArmy,
            ])
            .no_cost()
            .any_performed()
            .check(game, player)
    }
}

// ─────────────────────────────────────────────────────────────
//  Expanding an Empire
// ─────────────────────────────────────────────────────────────

/// Predicate for `invade-area`.
pub struct CanInvade;

impl CanInvade {
    /// An unoccupied reachable map area. Returns the expansion cost.
    #[instrument(skip(game), fields(player = %player, area = %area))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<u32, ActionError> {
        EXPANDING.check(game, player)?;
        has_empire(game, player)?;
        map_area(area)?;
        if game.areas.get(area).army.is_some() {
            return Err(ActionError::Occupied(area));
        }
        can_reach(game, player, area)?;
        let cost = expansion_cost(game);
        enough_armies(game, player, 1 + cost)?;
        Ok(cost)
    }
}

/// Predicate for `invade-area-warning` and `confirm-invasion`.
pub struct CanInvadeOccupied;

impl CanInvadeOccupied {
    /// A reachable area held by a rival. Returns the defender and the expansion cost.
    #[instrument(skip(game), fields(player = %player, area = %area))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<(PlayerId, u32), ActionError> {
        EXPANDING.check(game, player)?;
        has_empire(game, player)?;
        map_area(area)?;
        let defender = occupied_by_rival(game, player, area).ok_or(ActionError::NotOccupied(area))?;
        can_reach(game, player, area)?;
        let cost = expansion_cost(game);
        enough_armies(game, player, 1 + cost)?;
        Ok((defender, cost))
    }
}

/// Predicate for `cancel-invasion`.
pub struct CanCancelInvasion;

impl CanCancelInvasion {
    /// Only with an invasion awaiting confirmation.
    pub fn check(game: &Game, player: PlayerId) -> Result<AreaId, ActionError> {
        EXPANDING.check(game, player)?;
        game.pending_invasion.ok_or(ActionError::MissingArea)
    }
}

/// Predicate for `reinforce-army`.
pub struct CanReinforce;

impl CanReinforce {
    /// Exactly one own army in the area. Returns the expansion cost.
    #[instrument(skip(game), fields(player = %player, area = %area))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<u32, ActionError> {
        EXPANDING.check(game, player)?;
        has_empire(game, player)?;
        if game.areas.get(area).armies_of(player) != 1 {
            return Err(ActionError::CannotReinforce(area));
        }
        let cost = expansion_cost(game);
        enough_armies(game, player, 1 + cost)?;
        Ok(cost)
    }
}

/// A validated city destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destruction {
    /// Owner of the destroyed city.
    pub victim: PlayerId,
    /// Total armies spent.
    pub cost: u32,
}

/// Predicate for `destroy-city`.
pub struct CanDestroyCity;

impl CanDestroyCity {
    /// A rival city on a site the player's army holds.
    #[instrument(skip(game), fields(player = %player, area = %area))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<Destruction, ActionError> {
        EXPANDING.check(game, player)?;
        has_empire(game, player)?;
        sumer_site(area)?;
        if game.areas.get(area).armies_of(player) == 0 {
            return Err(ActionError::NoArmyIn(area));
        }
        let victim = game
            .areas
            .get(area)
            .city_owner()
            .filter(|&o| o != player)
            .ok_or(ActionError::NoRivalCity(area))?;
        let cost = expansion_cost(game) + destruction_cost(game, area);
        enough_armies(game, player, cost)?;
        Ok(Destruction { victim, cost })
    }
}

// ─────────────────────────────────────────────────────────────
//  Cities
// ─────────────────────────────────────────────────────────────

/// Cost of a city.
pub fn city_cost() -> Resources {
    let mut cost = Resources::single(Resource::Wood, 1);
    cost.add(Resource::Tool, 1);
    cost
}

/// Predicate for `build-city`. Returns true when a token is available.
pub struct CanBuildCity;

impl CanBuildCity {
    /// An empty Sumer site, one wood and one tool, and a token or a city to relocate.
    #[instrument(skip(game), fields(player = %player, area = %area))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<bool, ActionError> {
        Preconditions::action().check(game, player)?;
        sumer_site(area)?;
        if game.areas.get(area).city.is_some() {
            return Err(ActionError::CityBuilt(area));
        }
        holds(&game.player(player).resources, &city_cost())?;
        let has_token = game.player(player).cities > 0;
        if !has_token && game.areas.cities_of(player).next().is_none() {
            return Err(ActionError::NoCityTokens);
        }
        Ok(has_token)
    }
}

/// Predicate for `abandon-city`.
pub struct CanAbandonCity;

impl CanAbandonCity {
    /// One of the player's other cities, after building without a token.
    #[instrument(skip(game), fields(player = %player, area = %area))]
    pub fn check(game: &Game, player: PlayerId, area: AreaId) -> Result<AreaId, ActionError> {
        Preconditions::action()
            .steps(&[MultiAction::BuiltCity])
            .no_cost()
            .check(game, player)?;
        let built = game.built_city.ok_or(ActionError::OutOfSequence(game.multi_action))?;
        if !game.areas.owns_city(player, area) {
            return Err(ActionError::NotYourCity(area));
        }
        if area == built {
            return Err(ActionError::SameArea);
        }
        Ok(built)
    }
}

/// A validated city expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    /// City expanded.
    pub area: AreaId,
    /// Points scored.
    pub points: u32,
}

/// Predicate for `expand-city`.
pub struct CanExpandCity;

impl CanExpandCity {
    const PRE: Preconditions = Preconditions::expansion();

    /// Exactly two wood plus at most one each of tool, oil, gold and lapis.
    #[instrument(skip(game, params), fields(player = %player, area = ?params.area()))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<Expansion, ActionError> {
        Self::PRE.check(game, player)?;
        let p = game.player(player);
        if p.vp_passed {
            return Err(ActionError::AlreadyVpPassed);
        }
        if game.expanded_city {
            return Err(ActionError::AlreadyExpandedThisPhase);
        }
        let area = params.require_area()?;
        let city = game
            .areas
            .get(area)
            .city
            .filter(|c| c.owner == player)
            .ok_or(ActionError::NotYourCity(area))?;
        if city.expanded {
            return Err(ActionError::AlreadyExpanded(area));
        }
        if p.expansions == 0 {
            return Err(ActionError::NoExpansions);
        }

        let spent = params.resources();
        for (r, n) in spent.iter() {
            match r {
                Resource::Wood if n != 2 => return Err(ActionError::WoodCount(n)),
                Resource::Wood => {}
                Resource::Tool | Resource::Oil | Resource::Gold | Resource::Lapis if n > 1 => {
                    return Err(ActionError::AtMostOne(n, r));
                }
                Resource::Tool | Resource::Oil | Resource::Gold | Resource::Lapis => {}
                _ if n > 0 => return Err(ActionError::NotForExpansion(n, r)),
                _ => {}
            }
        }
        holds(&p.resources, spent)?;
        let points = expansion_points(spent.total()).ok_or(ActionError::WoodCount(spent.get(Resource::Wood)))?;
        Ok(Expansion { area, points })
    }
}

// ─────────────────────────────────────────────────────────────
//  Passing
// ─────────────────────────────────────────────────────────────

/// Predicate for `pass`.
pub struct CanPass;

impl CanPass {
    /// Only before acting this turn. The bid must be held in full; an empty bid is valid.
    #[instrument(skip(game, bid), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, bid: &Resources) -> Result<(), ActionError> {
        Preconditions::action().no_cost().check(game, player)?;
        holds(&game.player(player).resources, bid)
    }
}

/// Predicate for `pay-action-cost`.
pub struct CanPayActionCost;

impl CanPayActionCost {
    /// Someone has passed, the cost is unpaid, and the player has the item.
    #[instrument(skip(game, params), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId, params: &Params) -> Result<Payment, ActionError> {
        Preconditions::action().no_cost().check(game, player)?;
        if !game.any_passed() {
            return Err(ActionError::NoActionCost);
        }
        let p = game.player(player);
        if p.paid_action_cost {
            return Err(ActionError::AlreadyPaid);
        }
        let payment = params.payment().ok_or(ActionError::BadParameter("payment"))?;
        let has = match payment {
            Payment::Army => p.armies > 0,
            Payment::Worker => p.workers > 0,
            Payment::Resource(r) => p.resources.get(r) > 0,
        };
        if !has {
            return Err(ActionError::NothingToPay(payment.to_string()));
        }
        Ok(payment)
    }
}

/// Predicate for `finish-turn`.
pub struct CanFinishTurn;

impl CanFinishTurn {
    /// Actions: an action was performed. ExpandCity: not yet finished.
    #[instrument(skip(game), fields(player = %player))]
    pub fn check(game: &Game, player: PlayerId) -> Result<(), ActionError> {
        IsActingPlayer::check(game, player)?;
        let p = game.player(player);
        match game.phase {
            Phase::Actions if !p.performed_action => Err(ActionError::NotPerformed(p.name.clone())),
            Phase::Actions => Ok(()),
            Phase::ExpandCity if p.vp_passed => Err(ActionError::AlreadyVpPassed),
            Phase::ExpandCity => Ok(()),
            other => Err(ActionError::WrongPhase(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::map::City;
    use crate::engine::testing::{build, first, new_game, place, station};

    #[test]
    fn test_start_empire_needs_strict_majority() {
        let mut game = new_game(31);
        let (me, rival) = (game.order[0], game.order[1]);
        place(&mut game, me, AreaId::Akkad, 1);
        place(&mut game, rival, AreaId::Akkad, 1);
        let params = Params::at(AreaId::Akkad);
        assert_eq!(
            CanStartEmpire::check(&game, me, &params),
            Err(ActionError::NotMostWorkers(AreaId::Akkad))
        );
        place(&mut game, me, AreaId::Akkad, 1);
        let founding = CanStartEmpire::check(&game, me, &params).unwrap();
        assert_eq!(founding.armies, 5);
        assert_eq!(founding.bonus, 0);
    }

    #[test]
    fn test_start_empire_in_sumer_waives_workers() {
        let mut game = new_game(32);
        let me = first(&game);
        build(&mut game, me, AreaId::Babylon);
        let founding = CanStartEmpire::check(&game, me, &Params::at(AreaId::Ur)).unwrap();
        assert_eq!(founding.armies, 6);
        assert_eq!(founding.bonus, BABYLON_BONUS);
    }

    #[test]
    fn test_buy_armies_rejects_huge_quantities() {
        let mut game = new_game(34);
        let me = first(&game);
        game.multi_action = MultiAction::StartedEmpire;

        let huge = Resources::single(Resource::Tool, 2_000_000_000);
        assert_eq!(
            CanBuyArmies::check(&game, me, &huge),
            Err(ActionError::Insufficient(2_000_000_000, Resource::Tool))
        );

        let everything = Resources::single(Resource::Tool, u32::MAX);
        game.player_mut(me).resources = everything;
        assert_eq!(
            CanBuyArmies::check(&game, me, &everything),
            Err(ActionError::BadParameter("resources"))
        );
    }

    #[test]
    fn test_start_empire_rejects_claimed_empire() {
        let mut game = new_game(33);
        let me = first(&game);
        game.empires.get_mut(2).unwrap().owner = Some(game.order[1]);
        assert!(matches!(
            CanStartEmpire::check(&game, me, &Params::at(AreaId::Kish)),
            Err(ActionError::EmpireTaken(_))
        ));
        assert_eq!(
            CanStartEmpire::check(&game, me, &Params::at(AreaId::Egypt)),
            Err(ActionError::NoEmpireFor(AreaId::Egypt))
        );
    }

    #[test]
    fn test_place_workers_limits() {
        let game = new_game(34);
        let me = first(&game);
        let params = Params::at(AreaId::Kish)
            .with_resource(Resource::Gold)
            .with_count(1);
        assert_eq!(
            CanPlaceWorkers::check(&game, me, &params),
            Err(ActionError::WorkersInSumer)
        );
        let params = Params::at(AreaId::Egypt)
            .with_resource(Resource::Wood)
            .with_count(3);
        assert_eq!(
            CanPlaceWorkers::check(&game, me, &params),
            Err(ActionError::WorkerCount(2))
        );
        let params = Params::at(AreaId::UsedScribes)
            .with_resource(Resource::Wood)
            .with_count(1);
        assert_eq!(
            CanPlaceWorkers::check(&game, me, &params),
            Err(ActionError::ClosedBox(AreaId::UsedScribes))
        );
    }

    #[test]
    fn test_scribe_cap_counts_every_scribe_box() {
        let mut game = new_game(35);
        let me = first(&game);
        place(&mut game, me, AreaId::UsedScribes, 1);
        let params = Params::at(AreaId::Scribes)
            .with_resource(Resource::Gold)
            .with_count(2);
        assert_eq!(
            CanPlaceWorkers::check(&game, me, &params),
            Err(ActionError::ScribeLimit)
        );
        let params = params.with_count(1);
        assert!(CanPlaceWorkers::check(&game, me, &params).is_ok());
    }

    #[test]
    fn test_traders_follow_army_control() {
        let mut game = new_game(36);
        let (me, rival) = (game.order[0], game.order[1]);
        place(&mut game, me, AreaId::Egypt, 2);
        assert_eq!(traders_in(&game, me, AreaId::Egypt), 2);
        station(&mut game, rival, AreaId::Egypt, 1);
        assert_eq!(traders_in(&game, me, AreaId::Egypt), 0);
        game.areas.get_mut(AreaId::Egypt).army = None;
        game.player_mut(rival).army_supply += 1;
        build(&mut game, me, AreaId::Sippar);
        assert_eq!(traders_in(&game, me, AreaId::Egypt), 3);
        game.player_mut(me).used_sippar = true;
        assert_eq!(traders_in(&game, me, AreaId::Egypt), 2);
        assert_eq!(traders_in(&game, me, AreaId::Lebanon), 0);
    }

    #[test]
    fn test_trade_uses_sippar_after_base_traders() {
        let mut game = new_game(37);
        let me = first(&game);
        place(&mut game, me, AreaId::Egypt, 1);
        build(&mut game, me, AreaId::Sippar);
        let params = Params::at(AreaId::Egypt).with_resource(Resource::Wood);
        assert!(!CanTrade::check(&game, me, &params).unwrap().uses_sippar);
        game.areas.get_mut(AreaId::Egypt).traded = 1;
        assert!(CanTrade::check(&game, me, &params).unwrap().uses_sippar);
        game.areas.get_mut(AreaId::Egypt).traded = 2;
        assert_eq!(
            CanTrade::check(&game, me, &params),
            Err(ActionError::NoTraders(AreaId::Egypt))
        );
    }

    #[test]
    fn test_invasion_needs_adjacency_or_home_foothold() {
        let mut game = new_game(38);
        let me = first(&game);
        game.empires.get_mut(0).unwrap().owner = Some(me);
        game.player_mut(me).draw_armies(3);
        assert_eq!(CanInvade::check(&game, me, AreaId::Akkad), Ok(0));
        assert_eq!(
            CanInvade::check(&game, me, AreaId::Kish),
            Err(ActionError::NotAdjacent(AreaId::Kish))
        );
        station(&mut game, me, AreaId::Akkad, 1);
        assert_eq!(CanInvade::check(&game, me, AreaId::Kish), Ok(0));
        assert_eq!(
            CanInvade::check(&game, me, AreaId::Egypt),
            Err(ActionError::NotAdjacent(AreaId::Egypt))
        );
    }

    #[test]
    fn test_expansion_cost_while_expanding() {
        let mut game = new_game(39);
        assert_eq!(expansion_cost(&game), 0);
        game.multi_action = MultiAction::ExpandEmpire;
        assert_eq!(expansion_cost(&game), 1);
        game.continue_expansion = true;
        assert_eq!(expansion_cost(&game), 0);
    }

    #[test]
    fn test_shuruppak_raises_destruction_cost() {
        let mut game = new_game(40);
        let (me, rival) = (game.order[0], game.order[1]);
        build(&mut game, rival, AreaId::Kish);
        assert_eq!(destruction_cost(&game, AreaId::Kish), 2);
        build(&mut game, rival, AreaId::Shuruppak);
        assert_eq!(destruction_cost(&game, AreaId::Kish), 3);

        game.empires.get_mut(2).unwrap().owner = Some(me);
        station(&mut game, me, AreaId::Kish, 1);
        game.player_mut(me).draw_armies(2);
        assert_eq!(
            CanDestroyCity::check(&game, me, AreaId::Kish),
            Err(ActionError::NotEnoughArmies(3, 2))
        );
        game.player_mut(me).draw_armies(1);
        assert_eq!(
            CanDestroyCity::check(&game, me, AreaId::Kish),
            Ok(Destruction {
                victim: rival,
                cost: 3
            })
        );
    }

    #[test]
    fn test_build_city_without_token_needs_existing_city() {
        let mut game = new_game(41);
        let me = first(&game);
        game.player_mut(me).cities = 0;
        assert_eq!(
            CanBuildCity::check(&game, me, AreaId::Ur),
            Err(ActionError::NoCityTokens)
        );
        game.areas.get_mut(AreaId::Eridu).city = Some(City {
            owner: me,
            expanded: false,
        });
        assert_eq!(CanBuildCity::check(&game, me, AreaId::Ur), Ok(false));
        assert_eq!(
            CanBuildCity::check(&game, me, AreaId::Egypt),
            Err(ActionError::NotSumerSite(AreaId::Egypt))
        );
    }

    #[test]
    fn test_expand_city_composition() {
        let mut game = new_game(42);
        let me = first(&game);
        build(&mut game, me, AreaId::Ur);
        game.phase = Phase::ExpandCity;
        game.player_mut(me).resources.add(Resource::Wood, 2);

        let spend = |counts| Params::at(AreaId::Ur).with_resources(Resources::from_counts(counts));
        assert_eq!(
            CanExpandCity::check(&game, me, &spend([0, 1, 0, 0, 0, 0, 0, 0])),
            Err(ActionError::WoodCount(1))
        );
        assert_eq!(
            CanExpandCity::check(&game, me, &spend([0, 2, 1, 0, 0, 0, 0, 0])),
            Err(ActionError::NotForExpansion(1, Resource::Metal))
        );
        assert_eq!(
            CanExpandCity::check(&game, me, &spend([0, 2, 0, 0, 0, 0, 2, 0])),
            Err(ActionError::AtMostOne(2, Resource::Gold))
        );
        let ok = CanExpandCity::check(&game, me, &spend([0, 2, 0, 0, 1, 1, 1, 0])).unwrap();
        assert_eq!(ok.points, 14);
    }

    #[test]
    fn test_pay_action_cost_needs_a_pass() {
        let mut game = new_game(43);
        let me = first(&game);
        let params = Params::none().with_payment(Payment::Army);
        assert_eq!(
            CanPayActionCost::check(&game, me, &params),
            Err(ActionError::NoActionCost)
        );
        let other = game.order[2];
        game.player_mut(other).passed = true;
        assert_eq!(
            CanPayActionCost::check(&game, me, &params),
            Err(ActionError::NothingToPay("army".into()))
        );
        let params = Params::none().with_payment(Payment::Resource(Resource::Oil));
        assert_eq!(
            CanPayActionCost::check(&game, me, &params),
            Ok(Payment::Resource(Resource::Oil))
        );
    }

    #[test]
    fn test_finish_turn_requires_an_action() {
        let mut game = new_game(44);
        let me = first(&game);
        let name = game.name_of(me).to_string();
        assert_eq!(
            CanFinishTurn::check(&game, me),
            Err(ActionError::NotPerformed(name))
        );
        game.player_mut(me).performed_action = true;
        assert_eq!(CanFinishTurn::check(&game, me), Ok(()));
    }
}
