//! Area selection and finishing a player turn.

use super::super::action::{Submission, View};
use super::super::contracts::IsActingPlayer;
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError};
use super::super::game::{Applied, Game};
use super::super::legality::CanFinishTurn;
use super::super::map::AreaId;
use super::super::phase::{MultiAction, Phase};
use super::workers::{place_scribed_worker, select_worker};
use tracing::{debug, info, instrument};

/// `select-area`: picks an area for the next dialog, or drives a scribe move.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn select_area(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    if !game.phase.accepts_input() {
        return Err(ActionError::WrongPhase(game.phase).into());
    }
    IsActingPlayer::check(game, player)?;
    let area = sub.params().require_area()?;

    match game.multi_action {
        MultiAction::UsedScribe => return select_worker(game, player, Some(area)),
        MultiAction::SelectedWorker => return place_scribed_worker(game, player, area),
        _ => {}
    }

    let view = match area {
        AreaId::Sumer => return Err(ActionError::UnknownArea(area.to_string()).into()),
        AreaId::WorkerStock => View::PassDialog,
        a if a.is_map_area() => View::AreaDialog,
        _ => View::WorkerBoxDialog,
    };
    game.selected_area = Some(area);
    debug!(%view, "Area selected");
    Ok(Applied::cache(view))
}

/// `finish-turn`: hand play to the next player, running any automatic phases.
#[instrument(skip_all, fields(player = %sub.player(), phase = %game.phase))]
pub(crate) fn finish_turn(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    CanFinishTurn::check(game, player)?;

    match game.phase {
        Phase::Actions => game.finish_actions_turn(player),
        Phase::ExpandCity => game.finish_expand_turn(player),
        other => return Err(ActionError::WrongPhase(other).into()),
    }
    info!(next = ?game.acting, phase = %game.phase, "Turn finished");
    Ok(Applied::save(View::Show))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionKind, Params};
    use crate::engine::dice::ScriptedDice;
    use crate::engine::testing::{first, new_game};

    fn select(game: &mut Game, area: AreaId) -> Result<Applied, EngineError> {
        let me = first(game);
        let sub = Submission::new(ActionKind::SelectArea, me, Params::at(area));
        select_area(game, &sub, &mut ScriptedDice::default())
    }

    #[test]
    fn test_select_area_picks_dialog() {
        let mut game = new_game(101);
        assert_eq!(select(&mut game, AreaId::Egypt).unwrap().view, View::AreaDialog);
        assert_eq!(select(&mut game, AreaId::Scribes).unwrap().view, View::WorkerBoxDialog);
        assert_eq!(select(&mut game, AreaId::WorkerStock).unwrap().view, View::PassDialog);
        assert_eq!(game.selected_area, Some(AreaId::WorkerStock));
        assert!(select(&mut game, AreaId::Sumer).is_err());
    }

    #[test]
    fn test_finish_turn_moves_to_next_player() {
        let mut game = new_game(102);
        let me = first(&game);
        game.player_mut(me).performed_action = true;
        let sub = Submission::new(ActionKind::FinishTurn, me, Params::none());
        let applied = finish_turn(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(applied, Applied::save(View::Show));
        assert_eq!(game.acting, Some(game.order[1]));
    }
}
