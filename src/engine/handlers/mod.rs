//! Action handlers.
//!
//! Every handler validates with its `CanX` predicate first and only then
//! mutates the working copy it was handed. A handler that returns an error
//! leaves nothing behind: [`Game::apply`] discards the copy.

mod admin;
mod city;
mod commerce;
mod empire;
mod military;
mod turn;
mod workers;

pub(crate) use admin::{
    admin_header, admin_non_sumer_area, admin_player, admin_sumer_area, admin_supply_table,
    admin_worker_box,
};
pub(crate) use city::{abandon_city, build_city, expand_city};
pub(crate) use commerce::{pass, pay_action_cost, trade_resource};
pub(crate) use empire::{
    buy_armies, cancel_start_empire, confirm_start_empire, equip_army, place_armies,
    start_empire,
};
pub(crate) use military::{
    cancel_invasion, confirm_invasion, destroy_city, invade_area, invade_area_warning,
    reinforce_army,
};
pub(crate) use turn::{finish_turn, select_area};
pub(crate) use workers::{from_stock, make_tool, place_workers, use_scribe};

use super::dice::Dice;
use super::game::Game;
use super::log::{CombatKind, LogEntry};
use super::map::{AreaId, ArmyToken};
use super::player::PlayerId;
use super::rules::{BattleReport, resolve_battle, success_threshold};
use tracing::{info, instrument};

/// Fights for `area` with every army `attacker` holds.
///
/// Strength is the base rating of each side's current-turn empire; equipment
/// never counts. Losses on both sides go back to their owners' supply. A cleared area
/// loses its army token.
#[instrument(skip(game, dice), fields(attacker = %attacker, defender = %defender, area = %area))]
pub(crate) fn fight(
    game: &mut Game,
    attacker: PlayerId,
    defender: PlayerId,
    area: AreaId,
    kind: CombatKind,
    dice: &mut dyn Dice,
) -> BattleReport {
    let attack_rating = game.empire_of(attacker).map_or(0, |e| *e.rating());
    let defend_rating = game
        .empire_of(defender)
        .or_else(|| game.empires.controlling(defender, area))
        .map_or(0, |e| *e.rating());
    let threshold = success_threshold(attack_rating, defend_rating);

    let attacking = game.player(attacker).armies;
    let defending = game.areas.get(area).armies_of(defender);
    let report = resolve_battle(attacking, defending, threshold, dice);

    game.player_mut(attacker).return_armies(*report.attacker_lost());
    game.player_mut(defender).army_supply += *report.defender_lost();
    let target = game.areas.get_mut(area);
    if report.cleared() {
        target.army = None;
    } else if let Some(army) = target.army.as_mut() {
        army.count = *report.defender_left();
    }

    info!(
        threshold,
        attacker_lost = report.attacker_lost(),
        defender_lost = report.defender_lost(),
        cleared = report.cleared(),
        "Battle resolved"
    );
    game.record(
        Some(attacker),
        LogEntry::Combat {
            kind,
            area,
            defender,
            threshold,
            rolls: report.rolls().clone(),
            attacker_lost: *report.attacker_lost(),
            defender_lost: *report.defender_lost(),
            cleared: report.cleared(),
        },
    );
    report
}

/// Sends `player`'s workers in `area` back to supply, logging the removal.
pub(crate) fn remove_own_workers(game: &mut Game, player: PlayerId, area: AreaId) {
    let count = std::mem::take(&mut game.areas.get_mut(area).workers[player.index()]);
    if count > 0 {
        game.player_mut(player).worker_supply += count;
        game.record(Some(player), LogEntry::RemoveWorkers { area, count });
    }
}

/// Moves `count` armies from `player`'s hand into `area`.
pub(crate) fn station_armies(game: &mut Game, player: PlayerId, area: AreaId, count: u32) {
    game.player_mut(player).armies -= count;
    let target = game.areas.get_mut(area);
    match target.army.as_mut() {
        Some(army) => army.count += count,
        None => {
            target.army = Some(ArmyToken {
                owner: player,
                count,
            })
        }
    }
}
