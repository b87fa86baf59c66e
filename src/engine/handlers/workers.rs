//! Worker placement, scribes and tool makers.

use super::super::action::{Submission, View};
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError};
use super::super::game::{Applied, Game, WorkerOrigin};
use super::super::legality::{
    CanMakeTool, CanPlaceScribedWorker, CanPlaceWorkers, CanSelectWorker, CanUseScribe,
};
use super::super::log::LogEntry;
use super::super::map::AreaId;
use super::super::phase::MultiAction;
use super::super::player::PlayerId;
use super::super::resources::{Resource, Resources};
use tracing::{debug, instrument};

/// Workers sent to the Scribes box wait in NewScribes until the turn ends.
fn landing(area: AreaId) -> AreaId {
    if area == AreaId::Scribes {
        AreaId::NewScribes
    } else {
        area
    }
}

/// `place-workers`: spend one resource, place up to its value in workers.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn place_workers(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let plan = CanPlaceWorkers::check(game, player, sub.params())?;

    let mut hand = game.player(player).resources;
    hand.transfer_to(&mut game.bank, &Resources::single(plan.spent, 1))
        .ok_or(ActionError::Insufficient(1, plan.spent))?;
    let p = game.player_mut(player);
    p.resources = hand;
    p.workers -= plan.count;
    p.performed_action = true;
    game.areas.get_mut(landing(plan.area)).workers[player.index()] += plan.count;
    game.placed_workers = true;
    game.multi_action = MultiAction::PlacedWorker;

    game.record(
        Some(player),
        LogEntry::PlaceWorkers {
            spent: plan.spent,
            count: plan.count,
            area: plan.area,
        },
    );
    Ok(Applied::cache(View::WorkersUpdate))
}

/// `use-scribe`: spend a ready scribe to move one worker.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn use_scribe(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    CanUseScribe::check(game, player)?;

    game.areas.get_mut(AreaId::Scribes).workers[player.index()] -= 1;
    game.areas.get_mut(AreaId::UsedScribes).workers[player.index()] += 1;
    game.player_mut(player).performed_action = false;
    game.multi_action = MultiAction::UsedScribe;
    game.scribe_from = None;
    debug!("Scribe spent");
    Ok(Applied::cache(View::WorkerBoxDialog))
}

/// `from-stock`: the scribe moves a worker from the player's hand.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn from_stock(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    select_worker(game, *sub.player(), None)
}

/// Records where the scribe's worker comes from.
pub(super) fn select_worker(
    game: &mut Game,
    player: PlayerId,
    area: Option<AreaId>,
) -> Result<Applied, EngineError> {
    let origin = CanSelectWorker::check(game, player, area)?;
    game.scribe_from = Some(origin);
    game.multi_action = MultiAction::SelectedWorker;
    debug!(?origin, "Worker selected");
    Ok(Applied::cache(View::Show))
}

/// Moves the selected worker to `area`.
pub(super) fn place_scribed_worker(
    game: &mut Game,
    player: PlayerId,
    area: AreaId,
) -> Result<Applied, EngineError> {
    let origin = CanPlaceScribedWorker::check(game, player, area)?;
    let from = match origin {
        WorkerOrigin::Stock => {
            game.player_mut(player).workers -= 1;
            "stock".to_string()
        }
        WorkerOrigin::Area(source) => {
            game.areas.get_mut(source).workers[player.index()] -= 1;
            source.to_string()
        }
    };
    game.areas.get_mut(landing(area)).workers[player.index()] += 1;
    game.scribe_from = None;
    game.multi_action = MultiAction::PlacedWorker;
    game.player_mut(player).performed_action = true;
    game.record(Some(player), LogEntry::UseScribe { from, to: area });
    Ok(Applied::cache(View::WorkersUpdate))
}

/// `make-tool`: a ready tool maker turns one metal into one tool.
#[instrument(skip_all, fields(player = %sub.player()))]
pub(crate) fn make_tool(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    CanMakeTool::check(game, player)?;

    game.areas.get_mut(AreaId::ToolMakers).workers[player.index()] -= 1;
    game.areas.get_mut(AreaId::UsedToolMakers).workers[player.index()] += 1;
    let mut hand = game.player(player).resources;
    hand.transfer_to(&mut game.bank, &Resources::single(Resource::Metal, 1))
        .ok_or(ActionError::Insufficient(1, Resource::Metal))?;
    game.bank
        .transfer_to(&mut hand, &Resources::single(Resource::Tool, 1))
        .ok_or(ActionError::BankEmpty(Resource::Tool))?;
    let p = game.player_mut(player);
    p.resources = hand;
    p.performed_action = true;
    game.multi_action = MultiAction::None;

    game.record(Some(player), LogEntry::MakeTool);
    Ok(Applied::cache(View::WorkersUpdate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionKind, Params};
    use crate::engine::dice::ScriptedDice;
    use crate::engine::testing::{first, new_game, place};

    fn submit(kind: ActionKind, player: PlayerId, params: Params) -> Submission {
        Submission::new(kind, player, params)
    }

    #[test]
    fn test_place_workers_spends_and_places() {
        let mut game = new_game(51);
        let me = first(&game);
        let sub = submit(
            ActionKind::PlaceWorkers,
            me,
            Params::at(AreaId::Egypt)
                .with_resource(Resource::Gold)
                .with_count(3),
        );
        let applied = place_workers(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(applied, Applied::cache(View::WorkersUpdate));
        assert_eq!(game.areas.get(AreaId::Egypt).workers_of(me), 3);
        assert_eq!(game.player(me).workers, 1);
        assert_eq!(game.player(me).resources.get(Resource::Gold), 0);
        assert_eq!(game.bank.get(Resource::Gold), 5);
        assert!(game.player(me).performed_action);
        assert!(game.placed_workers);
    }

    #[test]
    fn test_new_scribes_wait_a_turn() {
        let mut game = new_game(52);
        let me = first(&game);
        let sub = submit(
            ActionKind::PlaceWorkers,
            me,
            Params::at(AreaId::Scribes)
                .with_resource(Resource::Wood)
                .with_count(1),
        );
        place_workers(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.areas.get(AreaId::NewScribes).workers_of(me), 1);
        assert_eq!(game.areas.get(AreaId::Scribes).workers_of(me), 0);
    }

    #[test]
    fn test_scribe_moves_worker_between_areas() {
        let mut game = new_game(53);
        let me = first(&game);
        place(&mut game, me, AreaId::Scribes, 1);
        place(&mut game, me, AreaId::Egypt, 1);

        let sub = submit(ActionKind::UseScribe, me, Params::none());
        use_scribe(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.multi_action, MultiAction::UsedScribe);
        assert_eq!(game.areas.get(AreaId::UsedScribes).workers_of(me), 1);

        select_worker(&mut game, me, Some(AreaId::Egypt)).unwrap();
        assert_eq!(game.scribe_from, Some(WorkerOrigin::Area(AreaId::Egypt)));
        assert!(place_scribed_worker(&mut game, me, AreaId::Egypt).is_err());
        place_scribed_worker(&mut game, me, AreaId::Meluhha).unwrap();

        assert_eq!(game.areas.get(AreaId::Egypt).workers_of(me), 0);
        assert_eq!(game.areas.get(AreaId::Meluhha).workers_of(me), 1);
        assert_eq!(game.multi_action, MultiAction::PlacedWorker);
        assert!(game.player(me).performed_action);
        let last = game.render_log().pop().unwrap();
        assert!(last.ends_with("used scribe to move worker from Egypt to Meluhha."));
    }

    #[test]
    fn test_make_tool_converts_metal() {
        let mut game = new_game(54);
        let me = first(&game);
        place(&mut game, me, AreaId::ToolMakers, 1);
        let sub = submit(ActionKind::MakeTool, me, Params::none());
        make_tool(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.player(me).resources.get(Resource::Metal), 0);
        assert_eq!(game.player(me).resources.get(Resource::Tool), 2);
        assert_eq!(game.bank.get(Resource::Tool), 8);
        assert_eq!(game.areas.get(AreaId::UsedToolMakers).workers_of(me), 1);
    }
}
