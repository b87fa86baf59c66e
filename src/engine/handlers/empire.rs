//! Founding an empire: claim, buy, equip, then place or fight.

use super::super::action::{Submission, View};
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError, IntegrityError};
use super::super::game::{Applied, Game};
use super::super::legality::{
    CanBuyArmies, CanCancelStartEmpire, CanConfirmStartEmpire, CanEquipArmy, CanPlaceArmies,
    CanStartEmpire,
};
use super::super::log::{CombatKind, LogEntry};
use super::super::phase::MultiAction;
use super::{fight, remove_own_workers, station_armies};
use tracing::{info, instrument};

/// `start-empire`: claim the current-turn empire bound to the area.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn start_empire(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let founding = CanStartEmpire::check(game, player, sub.params())?;

    let empire = game
        .empires
        .get_mut(founding.empire)
        .ok_or_else(|| IntegrityError::new("Empire row vanished"))?;
    empire.owner = Some(player);
    let name = *empire.name();

    let drawn = game.player_mut(player).draw_armies(founding.armies);
    game.record(
        Some(player),
        LogEntry::StartEmpire {
            empire: name,
            area: founding.area,
            armies: drawn,
        },
    );
    if founding.bonus > 0 {
        let bonus = game.player_mut(player).draw_armies(founding.bonus);
        game.record(Some(player), LogEntry::BabylonBonus { armies: bonus });
    }

    game.founding_area = Some(founding.area);
    game.multi_action = MultiAction::StartedEmpire;
    info!(empire = %name, "Empire founded");
    Ok(Applied::cache(View::EmpireUpdate))
}

/// `buy-armies`: grain, metal and tools into the bank for armies from supply.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn buy_armies(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let spent = *sub.params().resources();
    let armies = CanBuyArmies::check(game, player, &spent)?;

    let mut hand = game.player(player).resources;
    hand.transfer_to(&mut game.bank, &spent)
        .ok_or(ActionError::BadParameter("resources"))?;
    let p = game.player_mut(player);
    p.resources = hand;
    let armies = p.draw_armies(armies);
    game.multi_action = MultiAction::BoughtArmies;

    game.record(Some(player), LogEntry::BuyArmies { spent, armies });
    Ok(Applied::cache(View::EmpireUpdate))
}

/// `equip-army`: metal and tools into the empire's equipment box.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn equip_army(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let spent = *sub.params().resources();
    let index = CanEquipArmy::check(game, player, &spent)?;

    let mut hand = game.player(player).resources;
    let empire = game
        .empires
        .get_mut(index)
        .ok_or_else(|| IntegrityError::new("Empire row vanished"))?;
    hand.transfer_to(&mut empire.equipment, &spent)
        .ok_or(ActionError::BadParameter("resources"))?;
    let name = *empire.name();
    game.player_mut(player).resources = hand;
    game.multi_action = MultiAction::EquippedArmy;

    game.record(Some(player), LogEntry::EquipArmy { spent, empire: name });
    Ok(Applied::cache(View::AreaDialog))
}

/// `place-armies`: one or two armies into an unoccupied empire area.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn place_armies(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let (area, count) = CanPlaceArmies::check(game, player, sub.params())?;

    station_armies(game, player, area, count);
    game.record(Some(player), LogEntry::PlaceArmies { area, count });
    remove_own_workers(game, player, area);

    game.player_mut(player).performed_action = true;
    game.multi_action = MultiAction::None;
    Ok(Applied::cache(View::EmpireUpdate))
}

/// `confirm-start-empire`: fight for an occupied empire area.
///
/// Clearing the area leaves the player free to place armies there.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn confirm_start_empire(
    game: &mut Game,
    sub: &Submission,
    dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let (area, defender) = CanConfirmStartEmpire::check(game, player, sub.params())?;

    let report = fight(game, player, defender, area, CombatKind::StartEmpire, dice);
    if report.cleared() && game.player(player).armies > 0 {
        game.founding_area = Some(area);
        Ok(Applied::save(View::AreaDialog))
    } else {
        game.player_mut(player).performed_action = true;
        game.multi_action = MultiAction::None;
        Ok(Applied::save(View::EmpireUpdate))
    }
}

/// `cancel-start-empire`: drop the speculative founding.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn cancel_start_empire(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    CanCancelStartEmpire::check(game, *sub.player())?;
    Ok(Applied::undo())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionKind, Directive, Params};
    use crate::engine::dice::ScriptedDice;
    use crate::engine::map::AreaId;
    use crate::engine::player::PlayerId;
    use crate::engine::resources::{Resource, Resources};
    use crate::engine::testing::{build, first, new_game, place, station};

    fn run(
        game: &mut Game,
        handler: fn(&mut Game, &Submission, &mut dyn Dice) -> Result<Applied, EngineError>,
        kind: ActionKind,
        player: PlayerId,
        params: Params,
    ) -> Result<Applied, EngineError> {
        let sub = Submission::new(kind, player, params);
        handler(game, &sub, &mut ScriptedDice::default())
    }

    #[test]
    fn test_founding_sequence_places_armies() {
        let mut game = new_game(71);
        let me = first(&game);
        place(&mut game, me, AreaId::Akkad, 2);

        run(&mut game, start_empire, ActionKind::StartEmpire, me, Params::at(AreaId::Akkad)).unwrap();
        assert_eq!(game.player(me).armies, 5);
        assert_eq!(game.multi_action, MultiAction::StartedEmpire);

        let metal = Resources::single(Resource::Metal, 1);
        run(&mut game, buy_armies, ActionKind::BuyArmies, me, Params::none().with_resources(metal)).unwrap();
        assert_eq!(game.player(me).armies, 7);

        let tool = Resources::single(Resource::Tool, 1);
        run(&mut game, equip_army, ActionKind::EquipArmy, me, Params::none().with_resources(tool)).unwrap();
        assert_eq!(game.empire_of(me).unwrap().equipment.total(), 1);

        run(
            &mut game,
            place_armies,
            ActionKind::PlaceArmies,
            me,
            Params::at(AreaId::Akkad).with_count(2),
        )
        .unwrap();
        let akkad = game.areas.get(AreaId::Akkad);
        assert_eq!(akkad.armies_of(me), 2);
        assert_eq!(akkad.workers_of(me), 0);
        assert_eq!(game.player(me).armies, 5);
        assert!(game.player(me).performed_action);
        assert_eq!(game.multi_action, MultiAction::None);
        assert!(game.render_log().iter().any(|l| l.ends_with("removed 2 workers from Akkad.")));
    }

    #[test]
    fn test_babylon_city_grants_bonus_armies() {
        let mut game = new_game(72);
        let me = first(&game);
        build(&mut game, me, AreaId::Babylon);
        run(&mut game, start_empire, ActionKind::StartEmpire, me, Params::at(AreaId::Lagash)).unwrap();
        assert_eq!(game.player(me).armies, 8);
        assert!(
            game.render_log()
                .iter()
                .any(|l| l.ends_with("received 2 armies for city in Babylon."))
        );
    }

    #[test]
    fn test_confirm_start_empire_clears_defender() {
        let mut game = new_game(73);
        let (me, rival) = (game.order[0], game.order[1]);
        station(&mut game, rival, AreaId::Akkad, 1);
        place(&mut game, me, AreaId::Akkad, 1);
        run(&mut game, start_empire, ActionKind::StartEmpire, me, Params::at(AreaId::Akkad)).unwrap();
        run(&mut game, buy_armies, ActionKind::BuyArmies, me, Params::none()).unwrap();
        run(&mut game, equip_army, ActionKind::EquipArmy, me, Params::none()).unwrap();

        let sub = Submission::new(ActionKind::ConfirmStartEmpire, me, Params::none());
        let applied = confirm_start_empire(&mut game, &sub, &mut ScriptedDice::new([6, 6])).unwrap();
        assert_eq!(applied.directive, Directive::Save);
        assert!(game.areas.get(AreaId::Akkad).army.is_none());
        assert_eq!(game.player(rival).army_supply, 20);
        assert_eq!(game.multi_action, MultiAction::EquippedArmy);
        assert!(!game.player(me).performed_action);
    }

    #[test]
    fn test_failed_attack_ends_the_action() {
        let mut game = new_game(74);
        let (me, rival) = (game.order[0], game.order[1]);
        station(&mut game, rival, AreaId::Akkad, 2);
        place(&mut game, me, AreaId::Akkad, 1);
        run(&mut game, start_empire, ActionKind::StartEmpire, me, Params::at(AreaId::Akkad)).unwrap();
        run(&mut game, buy_armies, ActionKind::BuyArmies, me, Params::none()).unwrap();
        run(&mut game, equip_army, ActionKind::EquipArmy, me, Params::none()).unwrap();

        let sub = Submission::new(ActionKind::ConfirmStartEmpire, me, Params::none());
        confirm_start_empire(&mut game, &sub, &mut ScriptedDice::new([1])).unwrap();
        assert_eq!(game.player(me).armies, 0);
        assert_eq!(game.player(me).army_supply, 20);
        assert_eq!(game.areas.get(AreaId::Akkad).armies_of(rival), 2);
        assert!(game.player(me).performed_action);
        assert_eq!(game.multi_action, MultiAction::None);
    }

    #[test]
    fn test_equipped_founder_against_stronger_empire_needs_seven() {
        let mut game = new_game(76);
        let (me, rival) = (game.order[0], game.order[1]);
        game.empires.get_mut(0).unwrap().owner = Some(rival);
        station(&mut game, rival, AreaId::Zagros, 2);
        place(&mut game, me, AreaId::Zagros, 1);
        run(&mut game, start_empire, ActionKind::StartEmpire, me, Params::at(AreaId::Zagros)).unwrap();
        assert_eq!(*game.empire_of(me).unwrap().rating(), 2);
        run(&mut game, buy_armies, ActionKind::BuyArmies, me, Params::none()).unwrap();
        let tool = Resources::single(Resource::Tool, 1);
        run(&mut game, equip_army, ActionKind::EquipArmy, me, Params::none().with_resources(tool)).unwrap();

        let sub = Submission::new(ActionKind::ConfirmStartEmpire, me, Params::none());
        confirm_start_empire(&mut game, &sub, &mut ScriptedDice::new([3, 3])).unwrap();
        assert_eq!(game.player(me).armies, 0);
        assert_eq!(game.areas.get(AreaId::Zagros).armies_of(rival), 2);
        assert!(game.player(me).performed_action);
        let last = game.render_log().pop().unwrap();
        assert!(last.contains("attacked Zagros needing 7"), "{last}");
    }

    #[test]
    fn test_cancel_only_mid_founding() {
        let mut game = new_game(75);
        let me = first(&game);
        let err = run(&mut game, cancel_start_empire, ActionKind::CancelStartEmpire, me, Params::none())
            .unwrap_err();
        assert!(matches!(err.validation(), Some(ActionError::OutOfSequence(_))));
        run(&mut game, start_empire, ActionKind::StartEmpire, me, Params::at(AreaId::Ur)).unwrap();
        let applied =
            run(&mut game, cancel_start_empire, ActionKind::CancelStartEmpire, me, Params::none()).unwrap();
        assert_eq!(applied, Applied::undo());
    }
}
