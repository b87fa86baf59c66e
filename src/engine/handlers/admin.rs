//! Administrative overrides.
//!
//! These bypass every rule and write the addressed state directly. The
//! submission contract has already checked the admin flag.

use super::super::action::{AdminOverride, Submission, View};
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError};
use super::super::game::{Applied, Game};
use super::super::log::LogEntry;
use tracing::{instrument, warn};

fn payload(sub: &Submission) -> Result<&AdminOverride, ActionError> {
    sub.params()
        .admin()
        .as_ref()
        .ok_or(ActionError::BadParameter("admin"))
}

fn wrong_target(sub: &Submission) -> EngineError {
    warn!(kind = %sub.kind(), "Override payload does not match the action");
    ActionError::BadParameter("admin").into()
}

fn done(game: &mut Game, what: String) -> Result<Applied, EngineError> {
    game.record(None, LogEntry::Admin { what });
    Ok(Applied::save(View::Show))
}

/// `admin-header`: turn, round and phase.
#[instrument(skip_all)]
pub(crate) fn admin_header(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let AdminOverride::Header { turn, round, phase } = payload(sub)? else {
        return Err(wrong_target(sub));
    };
    game.turn = *turn;
    game.round = *round;
    game.phase = *phase;
    done(game, "the game header".to_string())
}

/// `admin-sumer-area`: a Sumer site's city and army.
#[instrument(skip_all)]
pub(crate) fn admin_sumer_area(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let AdminOverride::SumerArea { area, city, army } = payload(sub)? else {
        return Err(wrong_target(sub));
    };
    if !area.is_sumer() {
        return Err(ActionError::NotSumerSite(*area).into());
    }
    let target = game.areas.get_mut(*area);
    target.city = *city;
    target.army = *army;
    done(game, area.to_string())
}

/// `admin-non-sumer-area`: a trade region's workers and army.
#[instrument(skip_all)]
pub(crate) fn admin_non_sumer_area(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let AdminOverride::NonSumerArea { area, workers, army } = payload(sub)? else {
        return Err(wrong_target(sub));
    };
    if !area.is_non_sumer() {
        return Err(ActionError::NotMapArea(*area).into());
    }
    let target = game.areas.get_mut(*area);
    target.workers = *workers;
    target.army = *army;
    done(game, area.to_string())
}

/// `admin-worker-box`: the workers in one holding box.
#[instrument(skip_all)]
pub(crate) fn admin_worker_box(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let AdminOverride::WorkerBox { area, workers } = payload(sub)? else {
        return Err(wrong_target(sub));
    };
    if !area.is_worker_box() {
        return Err(ActionError::ClosedBox(*area).into());
    }
    game.areas.get_mut(*area).workers = *workers;
    done(game, area.to_string())
}

/// `admin-player`: one player's holdings and flags.
#[instrument(skip_all)]
pub(crate) fn admin_player(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let AdminOverride::Player(values) = payload(sub)? else {
        return Err(wrong_target(sub));
    };
    let p = game.player_mut(values.player);
    p.resources = values.resources;
    p.cities = values.cities;
    p.expansions = values.expansions;
    p.workers = values.workers;
    p.worker_supply = values.worker_supply;
    p.armies = values.armies;
    p.army_supply = values.army_supply;
    p.bid = values.bid;
    p.score = values.score;
    p.passed = values.passed;
    p.vp_passed = values.vp_passed;
    p.performed_action = values.performed_action;
    p.paid_action_cost = values.paid_action_cost;
    let what = p.name.clone();
    done(game, what)
}

/// `admin-supply-table`: the shared bank.
#[instrument(skip_all)]
pub(crate) fn admin_supply_table(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let AdminOverride::SupplyTable { bank } = payload(sub)? else {
        return Err(wrong_target(sub));
    };
    game.bank = *bank;
    done(game, "the supply table".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionKind, Params};
    use crate::engine::dice::ScriptedDice;
    use crate::engine::map::{AreaId, City};
    use crate::engine::phase::Phase;
    use crate::engine::player::PlayerId;
    use crate::engine::resources::Resources;
    use crate::engine::testing::new_game;

    fn admin(kind: ActionKind, payload: AdminOverride) -> Submission {
        Submission::new(kind, PlayerId::all()[0], Params::none().with_admin(payload)).as_admin()
    }

    #[test]
    fn test_header_override() {
        let mut game = new_game(111);
        let sub = admin(
            ActionKind::AdminHeader,
            AdminOverride::Header {
                turn: 3,
                round: 2,
                phase: Phase::ExpandCity,
            },
        );
        let applied = admin_header(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(applied, Applied::save(View::Show));
        assert_eq!((game.turn, game.round, game.phase), (3, 2, Phase::ExpandCity));
        assert_eq!(game.render_log().pop().unwrap(), "Admin updated the game header.");
    }

    #[test]
    fn test_sumer_override_rejects_trade_region() {
        let mut game = new_game(112);
        let payload = AdminOverride::SumerArea {
            area: AreaId::Egypt,
            city: Some(City {
                owner: PlayerId::all()[1],
                expanded: true,
            }),
            army: None,
        };
        let sub = admin(ActionKind::AdminSumerArea, payload);
        let err = admin_sumer_area(&mut game, &sub, &mut ScriptedDice::default()).unwrap_err();
        assert_eq!(err.validation(), Some(&ActionError::NotSumerSite(AreaId::Egypt)));
    }

    #[test]
    fn test_payload_must_match_action() {
        let mut game = new_game(113);
        let sub = admin(
            ActionKind::AdminHeader,
            AdminOverride::SupplyTable {
                bank: Resources::empty(),
            },
        );
        assert!(admin_header(&mut game, &sub, &mut ScriptedDice::default()).is_err());
        admin_supply_table(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert!(game.bank.is_empty());
    }

    #[test]
    fn test_player_override_for_missing_seat_never_parses() {
        let err = serde_json::from_str::<AdminOverride>(r#"{"target":"player","player":7}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Seat 7 does not exist"));
    }
}
