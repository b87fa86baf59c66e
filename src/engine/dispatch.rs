//! Maps each action name to its handler.

use super::action::{ActionKind, Submission};
use super::dice::Dice;
use super::error::EngineError;
use super::game::{Applied, Game};
use super::handlers;

/// A handler mutates a working copy of the game and reports the directive.
pub type Handler = fn(&mut Game, &Submission, &mut dyn Dice) -> Result<Applied, EngineError>;

/// Handler for `kind`. The match is exhaustive: adding an action without a
/// handler does not compile.
pub fn handler(kind: ActionKind) -> Handler {
    use ActionKind as K;
    match kind {
        K::SelectArea => handlers::select_area,
        K::BuildCity => handlers::build_city,
        K::BuyArmies => handlers::buy_armies,
        K::EquipArmy => handlers::equip_army,
        K::PlaceArmies => handlers::place_armies,
        K::PlaceWorkers => handlers::place_workers,
        K::TradeResource => handlers::trade_resource,
        K::UseScribe => handlers::use_scribe,
        K::FromStock => handlers::from_stock,
        K::MakeTool => handlers::make_tool,
        K::StartEmpire => handlers::start_empire,
        K::CancelStartEmpire => handlers::cancel_start_empire,
        K::ConfirmStartEmpire => handlers::confirm_start_empire,
        K::InvadeArea => handlers::invade_area,
        K::InvadeAreaWarning => handlers::invade_area_warning,
        K::CancelInvasion => handlers::cancel_invasion,
        K::ConfirmInvasion => handlers::confirm_invasion,
        K::ReinforceArmy => handlers::reinforce_army,
        K::DestroyCity => handlers::destroy_city,
        K::Pass => handlers::pass,
        K::PayActionCost => handlers::pay_action_cost,
        K::ExpandCity => handlers::expand_city,
        K::AbandonCity => handlers::abandon_city,
        K::FinishTurn => handlers::finish_turn,
        K::AdminHeader => handlers::admin_header,
        K::AdminSumerArea => handlers::admin_sumer_area,
        K::AdminNonSumerArea => handlers::admin_non_sumer_area,
        K::AdminWorkerBox => handlers::admin_worker_box,
        K::AdminPlayer => handlers::admin_player,
        K::AdminSupplyTable => handlers::admin_supply_table,
    }
}
