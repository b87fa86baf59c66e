//! Trade, passing and the action cost.

use super::super::action::{Payment, Submission, View};
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError};
use super::super::game::{Applied, Game};
use super::super::legality::{CanPass, CanPayActionCost, CanTrade};
use super::super::log::LogEntry;
use super::super::phase::MultiAction;
use super::super::resources::Resources;
use tracing::{debug, instrument};

/// `trade-resource`: one unit to the bank for one unit of the area's product.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn trade_resource(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let plan = CanTrade::check(game, player, sub.params())?;

    let mut hand = game.player(player).resources;
    hand.transfer_to(&mut game.bank, &Resources::single(plan.gave, 1))
        .ok_or(ActionError::Insufficient(1, plan.gave))?;
    if plan.got.is_unlimited() {
        hand.add(plan.got, 1);
    } else {
        game.bank
            .transfer_to(&mut hand, &Resources::single(plan.got, 1))
            .ok_or(ActionError::BankEmpty(plan.got))?;
    }

    let p = game.player_mut(player);
    p.resources = hand;
    p.performed_action = true;
    p.used_sippar |= plan.uses_sippar;
    game.areas.get_mut(plan.area).traded += 1;
    game.multi_action = MultiAction::TradedResource;

    game.record(
        Some(player),
        LogEntry::Trade {
            area: plan.area,
            gave: plan.gave,
            got: plan.got,
        },
    );
    Ok(Applied::cache(View::TradeUpdate))
}

/// `pass`: stop acting this round, committing a turn-order bid.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn pass(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let bid = *sub.params().resources();
    CanPass::check(game, player, &bid)?;

    let p = game.player_mut(player);
    let mut hand = p.resources;
    hand.transfer_to(&mut p.bid, &bid)
        .ok_or(ActionError::BadParameter("bid"))?;
    p.resources = hand;
    p.passed = true;
    p.performed_action = true;
    debug!(value = bid.bid_value(), "Passed");

    game.record(Some(player), LogEntry::Pass { bid });
    Ok(Applied::cache(View::PassUpdate))
}

/// `pay-action-cost`: discard one army, worker or resource unit.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn pay_action_cost(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let payment = CanPayActionCost::check(game, player, sub.params())?;

    match payment {
        Payment::Army => {
            game.player_mut(player).return_armies(1);
        }
        Payment::Worker => {
            let p = game.player_mut(player);
            p.workers -= 1;
            p.worker_supply += 1;
        }
        Payment::Resource(r) => {
            let mut hand = game.player(player).resources;
            hand.transfer_to(&mut game.bank, &Resources::single(r, 1))
                .ok_or(ActionError::Insufficient(1, r))?;
            game.player_mut(player).resources = hand;
        }
    }
    game.player_mut(player).paid_action_cost = true;

    game.record(
        Some(player),
        LogEntry::PayActionCost {
            paid: payment.to_string(),
        },
    );
    Ok(Applied::cache(View::ActionCostUpdate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionKind, Params};
    use crate::engine::dice::ScriptedDice;
    use crate::engine::map::AreaId;
    use crate::engine::resources::Resource;
    use crate::engine::testing::{build, first, new_game, place};

    #[test]
    fn test_trade_swaps_with_bank() {
        let mut game = new_game(61);
        let me = first(&game);
        place(&mut game, me, AreaId::Egypt, 1);
        let sub = Submission::new(
            ActionKind::TradeResource,
            me,
            Params::at(AreaId::Egypt).with_resource(Resource::Wood),
        );
        trade_resource(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        let hand = game.player(me).resources;
        assert_eq!(hand.get(Resource::Wood), 0);
        assert_eq!(hand.get(Resource::Gold), 2);
        assert_eq!(game.bank.get(Resource::Gold), 3);
        assert_eq!(game.bank.get(Resource::Wood), 10);
        assert_eq!(game.areas.get(AreaId::Egypt).traded, 1);
        assert_eq!(game.multi_action, MultiAction::TradedResource);

        let again = Submission::new(
            ActionKind::TradeResource,
            me,
            Params::at(AreaId::Egypt).with_resource(Resource::Metal),
        );
        let err = trade_resource(&mut game, &again, &mut ScriptedDice::default()).unwrap_err();
        assert_eq!(err.validation(), Some(&ActionError::NoTraders(AreaId::Egypt)));
    }

    #[test]
    fn test_sippar_trader_marks_use() {
        let mut game = new_game(62);
        let me = first(&game);
        place(&mut game, me, AreaId::Egypt, 1);
        build(&mut game, me, AreaId::Sippar);
        game.areas.get_mut(AreaId::Egypt).traded = 1;
        let sub = Submission::new(
            ActionKind::TradeResource,
            me,
            Params::at(AreaId::Egypt).with_resource(Resource::Oil),
        );
        trade_resource(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert!(game.player(me).used_sippar);
    }

    #[test]
    fn test_pass_moves_bid_out_of_hand() {
        let mut game = new_game(63);
        let me = first(&game);
        let bid = Resources::from_counts([0, 1, 0, 0, 0, 0, 1, 0]);
        let sub = Submission::new(ActionKind::Pass, me, Params::none().with_resources(bid));
        pass(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        let p = game.player(me);
        assert!(p.passed);
        assert_eq!(p.bid, bid);
        assert_eq!(p.bid_value(), 6);
        assert_eq!(p.resources.get(Resource::Gold), 0);
        assert!(game.render_log().pop().unwrap().ends_with("for a turn order bid of 6."));
    }

    #[test]
    fn test_pay_action_cost_with_worker() {
        let mut game = new_game(64);
        let me = first(&game);
        let other = game.order[1];
        game.player_mut(other).passed = true;
        let sub = Submission::new(
            ActionKind::PayActionCost,
            me,
            Params::none().with_payment(Payment::Worker),
        );
        let before = game.player(me).workers;
        pay_action_cost(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.player(me).workers, before - 1);
        assert!(game.player(me).paid_action_cost);
        let err = pay_action_cost(&mut game, &sub, &mut ScriptedDice::default()).unwrap_err();
        assert_eq!(err.validation(), Some(&ActionError::AlreadyPaid));
    }
}
