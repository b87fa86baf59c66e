//! The phase state machine.
//!
//! No submission advances a phase directly. Phases move on when their
//! completion condition holds (everyone passed, everyone finished expanding,
//! the final turn reached), and several may run back to back in one call.

use super::game::Game;
use super::log::LogEntry;
use super::map::AreaId;
use super::phase::{MultiAction, Phase};
use super::player::{PLAYER_COUNT, Player, PlayerId};
use super::resources::Resource;
use super::rules::{
    can_auto_pass, can_auto_vp_pass, end_game_awards, pair_results, rank_players,
    score_empires, sort_by_bid,
};
use tracing::{debug, info, instrument};

/// Workers collected each turn on top of one per city.
pub const BASE_WORKER_INCOME: u32 = 2;

impl Game {
    /// Opens the game and runs the first turn's automatic phases.
    #[instrument(skip(self))]
    pub(crate) fn start(&mut self) {
        self.phase = Phase::StartGame;
        self.record(None, LogEntry::Start { order: self.order });
        self.start_turn();
    }

    /// Advances the turn, runs collection, and opens the Actions phase.
    #[instrument(skip(self), fields(turn = self.turn + 1))]
    pub(crate) fn start_turn(&mut self) {
        self.turn += 1;
        self.phase = Phase::StartTurn;
        self.round = 1;
        self.acting = None;
        for p in &mut self.players {
            p.reset_for_phase();
        }
        self.record(None, LogEntry::StartTurn { turn: self.turn });

        self.collect_grain();
        self.collect_textile();
        self.collect_workers();
        self.reset_scribes();
        self.reset_tool_makers();
        self.decline_empires();

        self.phase = Phase::Actions;
        let first = self.order[0];
        self.acting = Some(first);
        self.begin_player_turn(first);
        info!(turn = self.turn, first = %first, "Actions phase opened");
    }

    fn collect_grain(&mut self) {
        let amounts = PlayerId::all().map(|p| {
            self.areas
                .cities_of(p)
                .map(|a| if a.city.is_some_and(|c| c.expanded) { 2 } else { 1 })
                .sum::<u32>()
        });
        self.collect(Resource::Grain, amounts);
    }

    fn collect_textile(&mut self) {
        let amounts = PlayerId::all().map(|p| {
            self.areas
                .cities_of(p)
                .filter(|a| a.id.is_textile_site())
                .count() as u32
        });
        self.collect(Resource::Textile, amounts);
    }

    fn collect(&mut self, resource: Resource, amounts: [u32; PLAYER_COUNT]) {
        if amounts.iter().all(|&n| n == 0) {
            return;
        }
        for (p, &n) in self.players.iter_mut().zip(amounts.iter()) {
            p.resources.add(resource, n);
        }
        debug!(%resource, ?amounts, "Collected");
        self.record(None, LogEntry::Collect { resource, amounts });
    }

    fn collect_workers(&mut self) {
        let built = PlayerId::all().map(|p| self.areas.cities_of(p).count() as u32);
        let mut amounts = [0; PLAYER_COUNT];
        for (i, p) in self.players.iter_mut().enumerate() {
            let n = p.worker_supply.min(BASE_WORKER_INCOME + built[i]);
            p.worker_supply -= n;
            p.workers += n;
            amounts[i] = n;
        }
        self.record(None, LogEntry::CollectWorkers { amounts });
    }

    fn reset_scribes(&mut self) {
        for p in PlayerId::all() {
            let i = p.index();
            let used = std::mem::take(&mut self.areas.get_mut(AreaId::UsedScribes).workers[i]);
            let new = std::mem::take(&mut self.areas.get_mut(AreaId::NewScribes).workers[i]);
            self.areas.get_mut(AreaId::Scribes).workers[i] += used + new;
        }
    }

    fn reset_tool_makers(&mut self) {
        for p in PlayerId::all() {
            let i = p.index();
            let used = std::mem::take(&mut self.areas.get_mut(AreaId::UsedToolMakers).workers[i]);
            self.areas.get_mut(AreaId::ToolMakers).workers[i] += used;
        }
    }

    /// Marks last turn's empires as declined; ownership is kept.
    fn decline_empires(&mut self) {
        let previous = self.turn.saturating_sub(1);
        let mut declined = Vec::new();
        for e in self.empires.iter_mut() {
            if *e.turn() == previous && !e.declined {
                if let Some(owner) = e.owner {
                    e.declined = true;
                    declined.push((*e.name(), owner));
                }
            }
        }
        for (empire, owner) in declined {
            self.record(Some(owner), LogEntry::Decline { empire, owner });
        }
    }

    /// Clears the per-player-turn state before `player` acts.
    pub(crate) fn begin_player_turn(&mut self, player: PlayerId) {
        self.player_mut(player).reset_for_turn();
        self.multi_action = MultiAction::None;
        self.selected_area = None;
        self.founding_area = None;
        self.built_city = None;
        self.scribe_from = None;
        self.pending_invasion = None;
        self.continue_expansion = false;
        self.placed_workers = false;
        self.expanded_city = false;
        for a in self.areas.iter_mut() {
            a.traded = 0;
        }
    }

    fn position(&self, player: PlayerId) -> usize {
        self.order.iter().position(|&p| p == player).unwrap_or(0)
    }

    /// Ends `current`'s Actions-phase turn and hands play to the next player
    /// who has not passed, or resolves the turn once everyone has.
    #[instrument(skip(self), fields(current = %current))]
    pub(crate) fn finish_actions_turn(&mut self, current: PlayerId) {
        let i = current.index();
        let fresh = std::mem::take(&mut self.areas.get_mut(AreaId::NewScribes).workers[i]);
        self.areas.get_mut(AreaId::Scribes).workers[i] += fresh;

        let start = self.position(current);
        for step in 1..=PLAYER_COUNT {
            let next = self.order[(start + step) % PLAYER_COUNT];
            if self.player(next).passed {
                continue;
            }
            self.begin_player_turn(next);
            if can_auto_pass(self.player(next)) {
                self.player_mut(next).passed = true;
                self.record(Some(next), LogEntry::AutoPass);
                continue;
            }
            if next == self.order[0] {
                self.round += 1;
            }
            self.acting = Some(next);
            debug!(next = %next, round = self.round, "Next player");
            return;
        }

        info!("Every player passed");
        self.acting = None;
        self.multi_action = MultiAction::None;
        self.order_of_play();
        self.score_empires();
        if self.open_expand_city() {
            self.finish_game_turn();
        }
    }

    /// Ends `current`'s expansion turn.
    #[instrument(skip(self), fields(current = %current))]
    pub(crate) fn finish_expand_turn(&mut self, current: PlayerId) {
        if !self.expanded_city {
            self.record(Some(current), LogEntry::NoCityExpansion);
        }
        self.player_mut(current).vp_passed = true;
        if self.next_expander(current) {
            self.finish_game_turn();
        }
    }

    /// Re-sorts turn order by bid.
    #[instrument(skip(self))]
    pub(crate) fn order_of_play(&mut self) {
        self.phase = Phase::OrderOfPlay;
        self.round = 1;
        let bids = PlayerId::all().map(|p| self.player(p).bid_value());
        let old = self.order;
        self.order = sort_by_bid(old, bids);
        info!(?old, new = ?self.order, ?bids, "Turn order sorted");
        self.record(
            None,
            LogEntry::OrderOfPlay {
                old,
                new: self.order,
                bids,
            },
        );
    }

    /// Scores every occupied map area for its army owner.
    #[instrument(skip(self))]
    pub(crate) fn score_empires(&mut self) {
        for p in &mut self.players {
            p.reset_for_phase();
        }
        self.phase = Phase::ScoreEmpire;
        self.round = 1;
        let scores = score_empires(&self.areas);
        for (p, points) in self.players.iter_mut().zip(scores.totals.iter()) {
            p.score += points;
        }
        let empires = PlayerId::all().map(|p| self.empire_of(p).map(|e| *e.name()));
        self.record(
            None,
            LogEntry::ScoreEmpires {
                per_area: scores.per_area,
                totals: scores.totals,
                empires,
            },
        );
    }

    /// Opens the ExpandCity phase; true if nobody can expand.
    #[instrument(skip(self))]
    pub(crate) fn open_expand_city(&mut self) -> bool {
        self.phase = Phase::ExpandCity;
        self.round = 1;
        for p in &mut self.players {
            p.reset_for_phase();
        }
        let last = self.order[PLAYER_COUNT - 1];
        self.next_expander(last)
    }

    /// Walks the order after `after`, auto-passing players who cannot expand.
    /// True once every player is done.
    fn next_expander(&mut self, after: PlayerId) -> bool {
        let start = self.position(after);
        for step in 1..=PLAYER_COUNT {
            let next = self.order[(start + step) % PLAYER_COUNT];
            if self.player(next).vp_passed {
                continue;
            }
            self.begin_player_turn(next);
            if can_auto_vp_pass(self.player(next)) {
                self.player_mut(next).vp_passed = true;
                self.record(Some(next), LogEntry::AutoPass);
                continue;
            }
            self.acting = Some(next);
            return false;
        }
        self.acting = None;
        true
    }

    fn finish_game_turn(&mut self) {
        if self.turn >= self.final_turn {
            self.end_game();
        } else {
            self.end_of_turn();
            self.start_turn();
        }
    }

    /// Clears the board and returns everything held for the turn.
    #[instrument(skip(self))]
    pub(crate) fn end_of_turn(&mut self) {
        self.phase = Phase::EndOfTurn;
        for a in self.areas.iter_mut() {
            a.army = None;
        }
        for p in &mut self.players {
            p.army_supply = Player::ARMY_SUPPLY;
            p.armies = 0;
            p.worker_supply += p.workers;
            p.workers = 0;
            let bid = std::mem::take(&mut p.bid);
            self.bank.deposit(&bid);
        }
        for e in self.empires.iter_mut() {
            let equipment = std::mem::take(&mut e.equipment);
            self.bank.deposit(&equipment);
        }
        self.record(None, LogEntry::EndOfTurn);
    }

    /// Final scoring, placements and winners.
    #[instrument(skip(self))]
    pub(crate) fn end_game(&mut self) {
        self.phase = Phase::EndGame;
        self.acting = None;
        let awards = end_game_awards(&self.areas);
        for &(_, p, points) in &awards {
            self.player_mut(p).score += points;
        }
        self.record(None, LogEntry::EndGameScoring { awards });

        let scores = PlayerId::all().map(|p| self.player(p).score);
        let places = rank_players(self.order, scores);
        self.results = pair_results(&places);
        self.winners = places.first().cloned().unwrap_or_default();

        self.phase = Phase::AnnounceWinners;
        self.record(
            None,
            LogEntry::AnnounceWinners {
                winners: self.winners.clone(),
            },
        );
        self.phase = Phase::GameOver;
        info!(winners = ?self.winners, ?scores, "Game over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::map::City;
    use crate::engine::testing::{build, first, new_game, place, station};

    #[test]
    fn test_start_turn_collects_and_resets() {
        let mut game = new_game(21);
        let p = first(&game);
        build(&mut game, p, AreaId::Ur);
        game.areas.get_mut(AreaId::Babylon).city = Some(City {
            owner: p,
            expanded: true,
        });
        game.player_mut(p).cities -= 1;
        place(&mut game, p, AreaId::UsedScribes, 1);
        place(&mut game, p, AreaId::UsedToolMakers, 1);
        let grain = game.player(p).resources.get(Resource::Grain);
        let textile = game.player(p).resources.get(Resource::Textile);
        let workers = game.player(p).workers;

        game.end_of_turn();
        game.start_turn();

        assert_eq!(game.turn, 2);
        assert_eq!(game.phase, Phase::Actions);
        assert_eq!(game.player(p).resources.get(Resource::Grain), grain + 3);
        assert_eq!(game.player(p).resources.get(Resource::Textile), textile + 1);
        assert_eq!(game.player(p).workers, 4);
        assert!(workers <= 2);
        assert_eq!(game.areas.get(AreaId::Scribes).workers_of(p), 1);
        assert_eq!(game.areas.get(AreaId::ToolMakers).workers_of(p), 1);
    }

    #[test]
    fn test_end_of_turn_refunds_and_clears() {
        let mut game = new_game(22);
        let p = first(&game);
        station(&mut game, p, AreaId::Egypt, 3);
        let gold = crate::engine::resources::Resources::single(Resource::Gold, 1);
        game.player_mut(p).resources.checked_sub(&gold).unwrap();
        game.player_mut(p).bid = gold;
        let bank_gold = game.bank.get(Resource::Gold);

        game.end_of_turn();

        assert!(game.areas.iter().all(|a| a.army.is_none()));
        assert_eq!(game.player(p).army_supply, Player::ARMY_SUPPLY);
        assert_eq!(game.player(p).workers, 0);
        assert!(game.player(p).bid.is_empty());
        assert_eq!(game.bank.get(Resource::Gold), bank_gold + 1);
    }

    #[test]
    fn test_decline_keeps_ownership() {
        let mut game = new_game(23);
        let p = first(&game);
        game.empires.get_mut(0).unwrap().owner = Some(p);
        game.end_of_turn();
        game.start_turn();
        let akkad = game.empires.get(0).unwrap();
        assert_eq!(akkad.owner, Some(p));
        assert!(akkad.declined);
        assert!(game.render_log().iter().any(|l| l.starts_with("The Akkad empire of")));
    }

    #[test]
    fn test_expand_city_auto_passes_everyone_without_wood() {
        let mut game = new_game(24);
        assert!(game.open_expand_city());
        assert!(game.players.iter().all(|p| p.vp_passed));
        assert_eq!(game.acting, None);
    }

    #[test]
    fn test_expand_city_stops_at_first_eligible_player() {
        let mut game = new_game(25);
        let second = game.order[1];
        build(&mut game, second, AreaId::Kish);
        game.player_mut(second).resources.add(Resource::Wood, 1);
        assert!(!game.open_expand_city());
        assert_eq!(game.acting, Some(second));
        assert!(game.player(game.order[0]).vp_passed);
        assert!(!game.player(game.order[2]).vp_passed);
    }

    #[test]
    fn test_end_game_ties_share_first_place() {
        let mut game = new_game(26);
        let [a, b, c] = game.order;
        game.player_mut(a).score = 10;
        game.player_mut(b).score = 10;
        game.player_mut(c).score = 4;
        game.end_game();
        assert_eq!(game.phase, Phase::GameOver);
        assert_eq!(game.winners, vec![a, b]);
        assert_eq!(game.results.len(), 3);
        let last = game.render_log().pop().unwrap();
        assert!(last.starts_with("Congratulations to: "));
    }
}
