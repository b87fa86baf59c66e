//! Validation and integrity errors.
//!
//! [`ActionError`] is a rejected submission: the message goes back to the
//! player and the game is left untouched. [`IntegrityError`] means the stored
//! state itself is wrong and the request must abort.

use super::empire::EmpireName;
use super::map::AreaId;
use super::phase::{MultiAction, Phase};
use super::resources::Resource;
use derive_more::{Display, Error, From};
use tracing::instrument;

/// A submission rejected by the legality checks.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ActionError {
    // ── submission ──
    /// Action name not in the vocabulary.
    #[display("{} is not a valid action.", _0)]
    UnknownAction(String),
    /// Area name not on the board.
    #[display("Area {} is not a valid area.", _0)]
    UnknownArea(String),
    /// The action needs an area and none was given.
    #[display("No area selected.")]
    MissingArea,
    /// A required parameter was absent or malformed.
    #[display("Missing or invalid {} parameter.", _0)]
    BadParameter(&'static str),
    /// Administrative override by a non-admin.
    #[display("You must be an admin to take this action.")]
    NotAdmin,

    // ── shared preconditions ──
    /// The game has finished.
    #[display("The game is over.")]
    GameOver,
    /// Action not allowed in the current phase.
    #[display("You can not take that action during the {} phase.", _0)]
    WrongPhase(Phase),
    /// Another multi-step action is in progress.
    #[display("You have another action in progress ({}).", _0)]
    ActionInProgress(MultiAction),
    /// The action does not continue the multi-step action in progress.
    #[display("That action can not follow {}.", _0)]
    OutOfSequence(MultiAction),
    /// Submitter is not the acting player.
    #[display("Only the current player can perform an action.")]
    NotCurrentPlayer,
    /// Submitter passed this round.
    #[display("You have already passed.")]
    AlreadyPassed,
    /// Someone passed and the submitter has not paid the action cost.
    #[display("After other players pass, you must pay action cost to perform an action.")]
    ActionCostUnpaid,
    /// Submitter already completed a definitive action this turn.
    #[display("You have already performed an action.")]
    AlreadyPerformed,
    /// Finishing a turn before acting.
    #[display("{} has yet to perform an action.", _0)]
    NotPerformed(String),

    // ── holdings ──
    /// Player lacks resources.
    #[display("You do not have {} {}.", _0, _1)]
    Insufficient(u32, Resource),
    /// The bank cannot pay out.
    #[display("The supply has no {}.", _0)]
    BankEmpty(Resource),
    /// Resource kind cannot buy armies.
    #[display("You can not buy armies with {}.", _0)]
    CannotBuyArmies(Resource),
    /// Only metal and tools equip an army.
    #[display("You can not equip an army with {}.", _0)]
    CannotEquip(Resource),
    /// Not enough armies on hand.
    #[display("You need {} armies but have {}.", _0, _1)]
    NotEnoughArmies(u32, u32),
    /// No workers on hand.
    #[display("You have no workers to place in {}.", _0)]
    NoWorkers(AreaId),
    /// Nothing to pay the action cost with.
    #[display("You do not have a {} to pay action cost.", _0)]
    NothingToPay(String),
    /// Action cost already paid this turn.
    #[display("You have already paid action cost.")]
    AlreadyPaid,
    /// No one has passed, so there is no action cost.
    #[display("No player has passed, so there is no action cost to pay.")]
    NoActionCost,

    // ── workers and scribes ──
    /// Workers never go to Sumer city-sites.
    #[display("You can't place workers in Sumer.")]
    WorkersInSumer,
    /// Destination box does not accept workers.
    #[display("You can't place workers in {}.", _0)]
    ClosedBox(AreaId),
    /// Two-scribe cap.
    #[display("You can not have more than 2 scribes.")]
    ScribeLimit,
    /// Workers already placed this turn.
    #[display("You have already placed workers.")]
    AlreadyPlacedWorkers,
    /// Worker count out of range for the resource spent.
    #[display("You may place between 1 and {} workers.", _0)]
    WorkerCount(u32),
    /// Exactly one resource unit must be spent to place workers.
    #[display("You must spend exactly one resource to place workers.")]
    OneResource,
    /// No ready scribe.
    #[display("You have no scribe to use.")]
    NoScribe,
    /// Player has no worker at the chosen origin.
    #[display("You have no worker in {}.", _0)]
    NoWorkerIn(AreaId),
    /// Scribe must move the worker somewhere else.
    #[display("The worker must move to a different area.")]
    SameArea,
    /// No ready tool maker.
    #[display("You have no tool maker available.")]
    NoToolMaker,

    // ── trade ──
    /// Area has no trade.
    #[display("You can not trade in {}.", _0)]
    NoTrade(AreaId),
    /// Every trader in the area has been used.
    #[display("You have no available traders in {}.", _0)]
    NoTraders(AreaId),

    // ── empires and armies ──
    /// No current-turn empire is bound to the area.
    #[display("No empire can be started in {}.", _0)]
    NoEmpireFor(AreaId),
    /// The matching empire is already claimed.
    #[display("The {} empire has already been started.", _0)]
    EmpireTaken(EmpireName),
    /// Player already founded an empire this turn.
    #[display("You have already started an empire this turn.")]
    AlreadyHasEmpire,
    /// Player does not have the strict worker majority.
    #[display("You do not have the most workers in {}.", _0)]
    NotMostWorkers(AreaId),
    /// Player has no empire this turn.
    #[display("You have not started an empire this turn.")]
    NoEmpire,
    /// Area is not the player's empire area.
    #[display("{} is not part of your empire.", _0)]
    NotEmpireArea(AreaId),
    /// Armies placed must be 1 or 2.
    #[display("You must place 1 or 2 armies, not {}.", _0)]
    ArmyCount(u32),
    /// Area holds another player's army.
    #[display("{} is occupied by another army.", _0)]
    Occupied(AreaId),
    /// Area holds no enemy army.
    #[display("{} is not occupied by another player.", _0)]
    NotOccupied(AreaId),
    /// No army adjacent and no empire foothold.
    #[display("You have no army adjacent to {}.", _0)]
    NotAdjacent(AreaId),
    /// Reinforcement needs exactly one own army in the area.
    #[display("You can not reinforce {}.", _0)]
    CannotReinforce(AreaId),
    /// Area is not a map area.
    #[display("{} can not hold an army.", _0)]
    NotMapArea(AreaId),

    // ── cities ──
    /// Area is not a Sumer city-site.
    #[display("{} is not a Sumer city-site.", _0)]
    NotSumerSite(AreaId),
    /// Site already has a city.
    #[display("{} already has a city.", _0)]
    CityBuilt(AreaId),
    /// Site has no city to destroy.
    #[display("There is no rival city in {}.", _0)]
    NoRivalCity(AreaId),
    /// Player has no army in the area.
    #[display("You have no army in {}.", _0)]
    NoArmyIn(AreaId),
    /// No city token and no city to relocate.
    #[display("You have no city to build.")]
    NoCityTokens,
    /// Player does not own the city.
    #[display("You do not own a city in {}.", _0)]
    NotYourCity(AreaId),
    /// City already expanded.
    #[display("The city in {} has already been expanded.", _0)]
    AlreadyExpanded(AreaId),
    /// No expansion tokens left.
    #[display("You have no expansions left.")]
    NoExpansions,
    /// One expansion per player per phase.
    #[display("You have already expanded a city.")]
    AlreadyExpandedThisPhase,
    /// Expansion requires exactly two wood.
    #[display("Received {} wood. Must use 2 wood.", _0)]
    WoodCount(u32),
    /// At most one unit of an optional kind.
    #[display("Received {} {}. Must spend only 0 or 1 {}", _0, _1, _1)]
    AtMostOne(u32, Resource),
    /// Kind not accepted for expansion.
    #[display("Received {} {}. Can't spend a {} to expand city.", _0, _1, _1)]
    NotForExpansion(u32, Resource),
    /// Player already finished the expansion round.
    #[display("You have already finished expanding cities.")]
    AlreadyVpPassed,
}

impl std::error::Error for ActionError {}

/// Corrupted or missing server-side state.
#[derive(Debug, Clone, Display, Error)]
#[display("Integrity error: {} at {}:{}", message, file, line)]
pub struct IntegrityError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl IntegrityError {
    /// Creates an integrity error tagged with the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for IntegrityError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed game state: {}", err))
    }
}

/// Any failure of an engine call.
#[derive(Debug, Clone, Display, From, Error)]
pub enum EngineError {
    /// The submission was illegal; state is unchanged.
    #[display("{}", _0)]
    Validation(ActionError),
    /// The state is corrupt; abort the request.
    #[display("{}", _0)]
    Integrity(IntegrityError),
}

impl EngineError {
    /// True for errors the host must treat as fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Integrity(_))
    }

    /// The validation error, if this is one.
    pub fn validation(&self) -> Option<&ActionError> {
        match self {
            EngineError::Validation(e) => Some(e),
            EngineError::Integrity(_) => None,
        }
    }
}
