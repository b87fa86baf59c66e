//! Submissions coming in and outcomes going out.
//!
//! A submission is a domain event: the acting player's intent, validated
//! before anything is applied.

use super::error::ActionError;
use super::log::LogRecord;
use super::map::{AreaId, ArmyToken, City};
use super::phase::Phase;
use super::player::PlayerId;
use super::resources::{Resource, Resources};
use super::rules::PairResult;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{instrument, warn};

/// The closed action vocabulary.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum ActionKind {
    SelectArea,
    BuildCity,
    BuyArmies,
    EquipArmy,
    PlaceArmies,
    PlaceWorkers,
    TradeResource,
    UseScribe,
    FromStock,
    MakeTool,
    StartEmpire,
    CancelStartEmpire,
    ConfirmStartEmpire,
    InvadeArea,
    InvadeAreaWarning,
    CancelInvasion,
    ConfirmInvasion,
    ReinforceArmy,
    DestroyCity,
    Pass,
    PayActionCost,
    ExpandCity,
    AbandonCity,
    FinishTurn,
    AdminHeader,
    AdminSumerArea,
    AdminNonSumerArea,
    AdminWorkerBox,
    AdminPlayer,
    AdminSupplyTable,
}

impl ActionKind {
    /// Parses an action name, rejecting anything outside the vocabulary.
    #[instrument]
    pub fn parse(name: &str) -> Result<Self, ActionError> {
        Self::from_str(name).map_err(|_| {
            warn!(name, "Unknown action");
            ActionError::UnknownAction(name.to_string())
        })
    }

    /// Administrative overrides bypass the rules and need the admin flag.
    pub fn is_admin(self) -> bool {
        matches!(
            self,
            ActionKind::AdminHeader
                | ActionKind::AdminSumerArea
                | ActionKind::AdminNonSumerArea
                | ActionKind::AdminWorkerBox
                | ActionKind::AdminPlayer
                | ActionKind::AdminSupplyTable
        )
    }
}

/// What a player hands over for the action cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payment {
    /// One army from hand.
    Army,
    /// One worker from hand.
    Worker,
    /// One unit of a resource.
    Resource(Resource),
}

impl std::fmt::Display for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payment::Army => write!(f, "army"),
            Payment::Worker => write!(f, "worker"),
            Payment::Resource(r) => write!(f, "{}", r),
        }
    }
}

/// Replacement values for a player, applied by `admin-player`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PlayerOverride {
    pub player: PlayerId,
    pub resources: Resources,
    pub cities: u32,
    pub expansions: u32,
    pub workers: u32,
    pub worker_supply: u32,
    pub armies: u32,
    pub army_supply: u32,
    pub bid: Resources,
    pub score: u32,
    pub passed: bool,
    pub vp_passed: bool,
    pub performed_action: bool,
    pub paid_action_cost: bool,
}

/// Payload of an administrative override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "kebab-case")]
pub enum AdminOverride {
    /// Turn, round and phase.
    Header {
        /// New turn number.
        turn: u8,
        /// New round number.
        round: u32,
        /// New phase.
        phase: Phase,
    },
    /// A Sumer site's city and army.
    SumerArea {
        /// Site to overwrite.
        area: AreaId,
        /// New city, if any.
        city: Option<City>,
        /// New army, if any.
        army: Option<ArmyToken>,
    },
    /// A trade region's workers and army.
    NonSumerArea {
        /// Region to overwrite.
        area: AreaId,
        /// Workers per player.
        workers: [u32; 3],
        /// New army, if any.
        army: Option<ArmyToken>,
    },
    /// A worker box's contents.
    WorkerBox {
        /// Box to overwrite.
        area: AreaId,
        /// Workers per player.
        workers: [u32; 3],
    },
    /// One player's holdings and flags.
    Player(PlayerOverride),
    /// The shared bank.
    SupplyTable {
        /// New bank contents.
        bank: Resources,
    },
}

/// Action-specific parameters. Each action reads only what it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct Params {
    area: Option<AreaId>,
    resources: Resources,
    resource: Option<Resource>,
    count: Option<u32>,
    payment: Option<Payment>,
    admin: Option<AdminOverride>,
}

impl Params {
    /// No parameters.
    pub fn none() -> Self {
        Self::default()
    }

    /// Targets an area.
    pub fn at(area: AreaId) -> Self {
        Self {
            area: Some(area),
            ..Self::default()
        }
    }

    /// Adds an area.
    pub fn with_area(mut self, area: AreaId) -> Self {
        self.area = Some(area);
        self
    }

    /// Adds a resource vector (bids, purchases, expansion spend).
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Adds a single resource kind (trade give, worker placement spend).
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Adds a count (workers or armies).
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Adds an action-cost payment.
    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payment = Some(payment);
        self
    }

    /// Adds an administrative override.
    pub fn with_admin(mut self, admin: AdminOverride) -> Self {
        self.admin = Some(admin);
        self
    }

    /// The area, or a validation error.
    pub fn require_area(&self) -> Result<AreaId, ActionError> {
        self.area.ok_or(ActionError::MissingArea)
    }

    /// The single resource kind, or a validation error.
    pub fn require_resource(&self) -> Result<Resource, ActionError> {
        self.resource.ok_or(ActionError::BadParameter("resource"))
    }

    /// The count, or a validation error.
    pub fn require_count(&self) -> Result<u32, ActionError> {
        self.count.ok_or(ActionError::BadParameter("count"))
    }
}

/// One player-submitted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Submission {
    kind: ActionKind,
    player: PlayerId,
    #[serde(default)]
    params: Params,
    /// Set by the host for administrators.
    #[serde(default)]
    admin: bool,
}

impl Submission {
    /// A regular submission.
    pub fn new(kind: ActionKind, player: PlayerId, params: Params) -> Self {
        Self {
            kind,
            player,
            params,
            admin: false,
        }
    }

    /// Parses the action name as submitted by the host.
    pub fn parse(name: &str, player: PlayerId, params: Params) -> Result<Self, ActionError> {
        Ok(Self::new(ActionKind::parse(name)?, player, params))
    }

    /// Marks the submission as coming from an administrator.
    pub fn as_admin(mut self) -> Self {
        self.admin = true;
        self
    }
}

/// What the host should do with the resulting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Directive {
    /// Nothing changed.
    None,
    /// Hold the new state speculatively so it can be undone.
    Cache,
    /// Commit the new state durably.
    Save,
    /// Discard the speculative state.
    Undo,
}

/// Which view the host should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum View {
    Show,
    AreaDialog,
    WorkerBoxDialog,
    PassDialog,
    PlayerDialog,
    EmpireUpdate,
    ConfirmInvasion,
    ExpandEmpireUpdate,
    WorkersUpdate,
    TradeUpdate,
    CityUpdate,
    ExpandCityUpdate,
    PassUpdate,
    ActionCostUpdate,
    FlashNotice,
}

/// Result of applying one submission.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Outcome {
    directive: Directive,
    view: View,
    /// Entries appended by this call.
    entries: Vec<LogRecord>,
    /// Newly active player, when the acting player changed.
    notify: Option<PlayerId>,
    /// Pairwise results, when this call finished the game.
    results: Option<Vec<PairResult>>,
}

impl Outcome {
    pub(crate) fn new(
        directive: Directive,
        view: View,
        entries: Vec<LogRecord>,
        notify: Option<PlayerId>,
        results: Option<Vec<PairResult>>,
    ) -> Self {
        Self {
            directive,
            view,
            entries,
            notify,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_action_name_round_trips() {
        for kind in ActionKind::iter() {
            assert_eq!(ActionKind::parse(&kind.to_string()), Ok(kind));
        }
        assert_eq!(ActionKind::InvadeAreaWarning.to_string(), "invade-area-warning");
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert_eq!(
            ActionKind::parse("launch-rocket"),
            Err(ActionError::UnknownAction("launch-rocket".into()))
        );
    }

    #[test]
    fn test_submission_deserializes_from_toml() {
        let text = r#"
            kind = "place-workers"
            player = 1
            [params]
            area = "Egypt"
            resource = "gold"
            count = 3
        "#;
        let sub: Submission = toml::from_str(text).expect("parse");
        assert_eq!(*sub.kind(), ActionKind::PlaceWorkers);
        assert_eq!(*sub.player(), PlayerId::all()[1]);
        assert_eq!(*sub.params().area(), Some(AreaId::Egypt));
        assert_eq!(*sub.params().resource(), Some(Resource::Gold));
        assert!(!sub.admin());
    }
}
