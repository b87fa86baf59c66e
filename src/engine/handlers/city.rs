//! Building, relocating and expanding cities.

use super::super::action::{Submission, View};
use super::super::dice::Dice;
use super::super::error::{ActionError, EngineError};
use super::super::game::{Applied, Game};
use super::super::legality::{CanAbandonCity, CanBuildCity, CanExpandCity, city_cost};
use super::super::log::LogEntry;
use super::super::map::City;
use super::super::phase::MultiAction;
use tracing::{info, instrument};

/// `build-city`: one wood and one tool for a city on an empty Sumer site.
///
/// Without a city token the player must abandon one of their cities next.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn build_city(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = sub.params().require_area()?;
    let has_token = CanBuildCity::check(game, player, area)?;

    let mut hand = game.player(player).resources;
    hand.transfer_to(&mut game.bank, &city_cost())
        .ok_or(ActionError::BadParameter("resources"))?;
    let p = game.player_mut(player);
    p.resources = hand;
    if has_token {
        p.cities -= 1;
        p.performed_action = true;
    } else {
        game.built_city = Some(area);
        game.multi_action = MultiAction::BuiltCity;
    }
    game.areas.get_mut(area).city = Some(City {
        owner: player,
        expanded: false,
    });

    game.record(Some(player), LogEntry::BuildCity { area });
    Ok(Applied::cache(View::CityUpdate))
}

/// `abandon-city`: give up a city to complete a tokenless build.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn abandon_city(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let area = sub.params().require_area()?;
    let built = CanAbandonCity::check(game, player, area)?;

    game.areas.get_mut(area).city = None;
    game.player_mut(player).performed_action = true;
    game.built_city = None;
    game.multi_action = MultiAction::None;

    game.record(Some(player), LogEntry::AbandonCity { area, built });
    Ok(Applied::cache(View::CityUpdate))
}

/// `expand-city`: spend two wood and optional luxuries for points.
#[instrument(skip_all, fields(player = %sub.player(), area = ?sub.params().area()))]
pub(crate) fn expand_city(
    game: &mut Game,
    sub: &Submission,
    _dice: &mut dyn Dice,
) -> Result<Applied, EngineError> {
    let player = *sub.player();
    let spent = *sub.params().resources();
    let plan = CanExpandCity::check(game, player, sub.params())?;

    let mut hand = game.player(player).resources;
    hand.transfer_to(&mut game.bank, &spent)
        .ok_or(ActionError::BadParameter("resources"))?;
    let p = game.player_mut(player);
    p.resources = hand;
    p.expansions -= 1;
    p.score += plan.points;
    if let Some(city) = game.areas.get_mut(plan.area).city.as_mut() {
        city.expanded = true;
    }
    game.expanded_city = true;

    info!(points = plan.points, "City expanded");
    game.record(
        Some(player),
        LogEntry::CityExpansion {
            area: plan.area,
            spent,
            points: plan.points,
        },
    );
    Ok(Applied::cache(View::ExpandCityUpdate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionKind, Params};
    use crate::engine::dice::ScriptedDice;
    use crate::engine::map::AreaId;
    use crate::engine::phase::Phase;
    use crate::engine::resources::{Resource, Resources};
    use crate::engine::testing::{build, first, new_game};

    #[test]
    fn test_build_city_uses_token() {
        let mut game = new_game(91);
        let me = first(&game);
        let sub = Submission::new(ActionKind::BuildCity, me, Params::at(AreaId::Ur));
        build_city(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.areas.get(AreaId::Ur).city_owner(), Some(me));
        assert_eq!(game.player(me).cities, 3);
        assert_eq!(game.player(me).resources.get(Resource::Wood), 0);
        assert_eq!(game.player(me).resources.get(Resource::Tool), 0);
        assert!(game.player(me).performed_action);
    }

    #[test]
    fn test_relocating_a_city() {
        let mut game = new_game(92);
        let me = first(&game);
        for site in [AreaId::Babylon, AreaId::Kish, AreaId::Isin, AreaId::Eridu] {
            build(&mut game, me, site);
        }
        let sub = Submission::new(ActionKind::BuildCity, me, Params::at(AreaId::Ur));
        build_city(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.multi_action, MultiAction::BuiltCity);
        assert!(!game.player(me).performed_action);

        let same = Submission::new(ActionKind::AbandonCity, me, Params::at(AreaId::Ur));
        let err = abandon_city(&mut game, &same, &mut ScriptedDice::default()).unwrap_err();
        assert_eq!(err.validation(), Some(&ActionError::SameArea));

        let sub = Submission::new(ActionKind::AbandonCity, me, Params::at(AreaId::Kish));
        abandon_city(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert!(game.areas.get(AreaId::Kish).city.is_none());
        assert_eq!(game.areas.cities_of(me).count(), 4);
        assert_eq!(game.player(me).cities, 0);
        assert!(
            game.render_log()
                .pop()
                .unwrap()
                .ends_with("abandoned the city in Kish to build a city in Ur.")
        );
    }

    #[test]
    fn test_expand_city_scores_points() {
        let mut game = new_game(93);
        let me = first(&game);
        build(&mut game, me, AreaId::Ur);
        game.phase = Phase::ExpandCity;
        game.player_mut(me).resources.add(Resource::Wood, 1);

        let spent = Resources::from_counts([0, 2, 0, 0, 0, 0, 1, 0]);
        let sub = Submission::new(
            ActionKind::ExpandCity,
            me,
            Params::at(AreaId::Ur).with_resources(spent),
        );
        expand_city(&mut game, &sub, &mut ScriptedDice::default()).unwrap();
        assert_eq!(game.player(me).score, 7);
        assert_eq!(game.player(me).expansions, 3);
        assert!(game.areas.get(AreaId::Ur).city.unwrap().expanded);

        let err = expand_city(&mut game, &sub, &mut ScriptedDice::default()).unwrap_err();
        assert_eq!(err.validation(), Some(&ActionError::AlreadyExpandedThisPhase));
    }
}
