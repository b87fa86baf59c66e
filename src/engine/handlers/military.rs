//! Expanding an empire: invasion, reinforcement, city destruction.

use super::super::action::{Submission, View};
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError};
use super::super::game::{Applied, Game};
use super::super::legality::{
    CanCancelInvasion, CanDestroyCity, CanInvade, CanInvadeOccupied, CanReinforce,
};
use super::super::log::{CombatKind, LogEntry};
use super::super::map::AreaId;
use super::super::phase::MultiAction;
use super::super::player::PlayerId;
use super::{fight, remove_own_workers, station_armies};
use tracing::{debug, instrument};

/// Pays the expansion cost and marks the empire as expanding.
fn pay_and_continue(game: &mut Game, player: PlayerId, cost: u32) {
    game.player_mut(player).return_armies(cost);
    game.player_mut(player).performed_action = true;
    game.multi_action = MultiAction::ExpandEmpire;
    game.continue_expansion = false;
    game.pending_invasion = None;
}

fn target(sub: &Submission) -> Result<AreaId, EngineError> {
    Ok(sub.params().require_area()?)
}

/// `invade-area`: move one army into an unoccupied area.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn invade_area(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = target(sub)?;
    let cost = CanInvade::check(game, player, area)?;

    pay_and_continue(game, player, cost);
    station_armies(game, player, area, 1);
    game.record(Some(player), LogEntry::Invade { area, cost });
    remove_own_workers(game, player, area);
    Ok(Applied::cache(View::ExpandEmpireUpdate))
}

/// `invade-area-warning`: ask for confirmation before attacking an occupied area.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn invade_area_warning(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = target(sub)?;
    let (defender, cost) = CanInvadeOccupied::check(game, player, area)?;
    debug!(defender = %defender, cost, "Invasion awaiting confirmation");
    game.pending_invasion = Some(area);
    Ok(Applied::cache(View::ConfirmInvasion))
}

/// `confirm-invasion`: pay the cost and fight with every army on hand.
///
/// A win clears the area and makes the next expansion step free.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn confirm_invasion(
    game: &mut Game,
    sub: &Submission,
    dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = sub
        .params()
        .area()
        .or(game.pending_invasion)
        .ok_or(ActionError::MissingArea)?;
    let (defender, cost) = CanInvadeOccupied::check(game, player, area)?;

    pay_and_continue(game, player, cost);
    let report = fight(game, player, defender, area, CombatKind::Invasion, dice);
    if report.cleared() {
        game.continue_expansion = true;
    } else {
        game.multi_action = MultiAction::None;
    }
    Ok(Applied::save(View::ExpandEmpireUpdate))
}

/// `cancel-invasion`: drop the pending invasion.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn cancel_invasion(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    CanCancelInvasion::check(game, *sub.player())?;
    Ok(Applied::undo())
}

/// `reinforce-army`: add a second army to a lone one.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn reinforce_army(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = target(sub)?;
    let cost = CanReinforce::check(game, player, area)?;

    pay_and_continue(game, player, cost);
    station_armies(game, player, area, 1);
    game.record(Some(player), LogEntry::Reinforce { area, cost });
    Ok(Applied::cache(View::ExpandEmpireUpdate))
}

/// `destroy-city`: remove a rival city from a site the player's army holds.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn destroy_city(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = target(sub)?;
    let plan = CanDestroyCity::check(game, player, area)?;

    pay_and_continue(game, player, plan.cost);
    game.areas.get_mut(area).city = None;
    game.player_mut(plan.victim).cities += 1;
    game.record(
        Some(player),
        LogEntry::DestroyCity {
            area,
            victim: plan.victim,
            cost: plan.cost,
        },
    );
    Ok(Applied::cache(View::ExpandEmpireUpdate))
}
