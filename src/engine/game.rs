//! The game aggregate and the single entry point for submissions.
//!
//! All state for one game lives in [`Game`]. The host hands it one
//! [`Submission`] at a time through [`Game::apply`]; legality is checked
//! before anything changes, and a rejected submission leaves the game as it was.

use super::action::{Directive, Outcome, Submission, View};
use super::contracts::{ActionContract, Contract};
use super::dice::Dice;
use super::dispatch;
use super::empire::{Empire, EmpireTable};
use super::error::{EngineError, IntegrityError};
use super::log::{LogEntry, LogRecord};
use super::map::{AreaId, Areas};
use super::phase::{MultiAction, Phase};
use super::player::{PLAYER_COUNT, Player, PlayerId};
use super::resources::Resources;
use super::rules::PairResult;
use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Where a scribe picked up the worker it is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerOrigin {
    /// The player's hand.
    Stock,
    /// A board area or worker box.
    Area(AreaId),
}

impl std::fmt::Display for WorkerOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerOrigin::Stock => write!(f, "Stock"),
            WorkerOrigin::Area(a) => write!(f, "{}", a),
        }
    }
}

/// One game, owned exclusively by the request processing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Game {
    pub(crate) turn: u8,
    pub(crate) final_turn: u8,
    pub(crate) round: u32,
    pub(crate) phase: Phase,
    pub(crate) multi_action: MultiAction,
    /// Players indexed by id.
    pub(crate) players: [Player; PLAYER_COUNT],
    /// Turn order.
    pub(crate) order: [PlayerId; PLAYER_COUNT],
    /// The single player whose input is awaited, if any.
    pub(crate) acting: Option<PlayerId>,
    pub(crate) bank: Resources,
    pub(crate) areas: Areas,
    pub(crate) empires: EmpireTable,
    pub(crate) winners: Vec<PlayerId>,
    pub(crate) results: Vec<PairResult>,
    /// A won battle makes the next expansion step free.
    pub(crate) continue_expansion: bool,
    pub(crate) expanded_city: bool,
    pub(crate) placed_workers: bool,
    pub(crate) selected_area: Option<AreaId>,
    /// Site chosen when founding this player-turn's empire.
    pub(crate) founding_area: Option<AreaId>,
    /// City built without a token, awaiting an abandoned city.
    pub(crate) built_city: Option<AreaId>,
    pub(crate) scribe_from: Option<WorkerOrigin>,
    pub(crate) pending_invasion: Option<AreaId>,
    pub(crate) log: Vec<LogRecord>,
}

impl Game {
    /// Sets up a new game and runs it through to the first Actions phase.
    ///
    /// `rng` only shuffles the initial turn order.
    #[instrument(skip(names, rng))]
    pub fn new(names: [String; PLAYER_COUNT], final_turn: u8, rng: &mut impl Rng) -> Self {
        let players = PlayerId::all().map(|id| Player::new(id, names[id.index()].clone()));
        let mut order = PlayerId::all();
        order.shuffle(rng);

        let mut game = Self {
            turn: 0,
            final_turn,
            round: 0,
            phase: Phase::Setup,
            multi_action: MultiAction::None,
            players,
            order,
            acting: None,
            bank: Resources::initial_bank(),
            areas: Areas::new(),
            empires: EmpireTable::new(),
            winners: Vec::new(),
            results: Vec::new(),
            continue_expansion: false,
            expanded_city: false,
            placed_workers: false,
            selected_area: None,
            founding_area: None,
            built_city: None,
            scribe_from: None,
            pending_invasion: None,
            log: Vec::new(),
        };

        for p in order {
            game.record(Some(p), LogEntry::Setup);
        }
        info!(order = ?game.order, "Game set up");
        game.start();
        game
    }

    /// Restores a game from a JSON snapshot, checking its shape.
    #[instrument(skip(json))]
    pub fn from_json(json: &str) -> Result<Self, IntegrityError> {
        let game: Self = serde_json::from_str(json)?;
        if !game.areas.is_well_formed() {
            return Err(IntegrityError::new("Area table is malformed"));
        }
        if game.players.iter().enumerate().any(|(i, p)| p.id.index() != i) {
            return Err(IntegrityError::new("Player ids do not match their seats"));
        }
        let mut seats = game.order;
        seats.sort();
        if seats != PlayerId::all() {
            return Err(IntegrityError::new("Turn order is not a permutation of the seats"));
        }
        Ok(game)
    }

    /// Serializes the game to a JSON snapshot.
    pub fn to_json(&self) -> Result<String, IntegrityError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Player by id.
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    /// Display names indexed by player id.
    pub fn names(&self) -> [String; PLAYER_COUNT] {
        PlayerId::all().map(|id| self.players[id.index()].name.clone())
    }

    /// Name of one player.
    pub fn name_of(&self, id: PlayerId) -> &str {
        &self.players[id.index()].name
    }

    /// True if `id` is the acting player.
    pub fn is_acting(&self, id: PlayerId) -> bool {
        self.acting == Some(id)
    }

    /// True if anyone has passed this round.
    pub fn any_passed(&self) -> bool {
        self.players.iter().any(|p| p.passed)
    }

    /// True if everyone has passed this round.
    pub fn all_passed(&self) -> bool {
        self.players.iter().all(|p| p.passed)
    }

    /// True if everyone has finished the expansion round.
    pub fn all_vp_passed(&self) -> bool {
        self.players.iter().all(|p| p.vp_passed)
    }

    /// The empire `player` founded this turn.
    pub fn empire_of(&self, player: PlayerId) -> Option<&Empire> {
        self.empires
            .owned_by(self.turn, player)
            .and_then(|i| self.empires.get(i))
    }

    /// True if `area` belongs to the empire `player` founded this turn.
    pub fn in_empire_area(&self, player: PlayerId, area: AreaId) -> bool {
        self.empire_of(player)
            .is_some_and(|e| *e.area() == area.empire_key())
    }

    /// Renders every log entry in order.
    pub fn render_log(&self) -> Vec<String> {
        let names = self.names();
        self.log.iter().map(|r| r.render(&names)).collect()
    }

    /// Appends a log entry stamped with the current turn and round.
    pub(crate) fn record(&mut self, player: Option<PlayerId>, entry: LogEntry) {
        self.log
            .push(LogRecord::new(self.turn, self.round, player, entry));
    }

    /// Applies one submission.
    ///
    /// On a validation error the game is untouched. On success the returned
    /// [`Outcome`] carries the directive, the view to render, the new log
    /// entries, and the newly active player if it changed.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] for illegal submissions,
    /// [`EngineError::Integrity`] when the stored state is inconsistent.
    #[instrument(skip(self, dice), fields(action = %submission.kind(), player = %submission.player(), phase = %self.phase))]
    pub fn apply(
        &mut self,
        submission: &Submission,
        dice: &mut dyn Dice,
        check_invariants: bool,
    ) -> Result<Outcome, EngineError> {
        ActionContract::pre(self, submission).inspect_err(|e| warn!(error = %e, "Rejected"))?;

        let mut next = self.clone();
        let log_len = next.log.len();
        let acting_before = next.acting;

        let handler = dispatch::handler(*submission.kind());
        let applied = handler(&mut next, submission, dice).inspect_err(|e| {
            if e.is_fatal() {
                warn!(error = %e, "Integrity failure");
            } else {
                warn!(error = %e, "Rejected");
            }
        })?;

        if check_invariants && !submission.kind().is_admin() {
            ActionContract::post(self, &next)?;
        }

        let entries = next.log[log_len..].to_vec();
        let notify = match next.acting {
            Some(p) if next.acting != acting_before => Some(p),
            _ => None,
        };
        let results = (next.phase == Phase::GameOver && self.phase != Phase::GameOver)
            .then(|| next.results.clone());

        if applied.directive != Directive::Undo {
            *self = next;
        }

        info!(directive = %applied.directive, view = %applied.view, entries = entries.len(), "Action applied");
        Ok(Outcome::new(
            applied.directive,
            applied.view,
            entries,
            notify,
            results,
        ))
    }
}

/// What a handler tells the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Persistence directive.
    pub directive: Directive,
    /// View to render.
    pub view: View,
}

impl Applied {
    pub(crate) fn cache(view: View) -> Self {
        Self {
            directive: Directive::Cache,
            view,
        }
    }

    pub(crate) fn save(view: View) -> Self {
        Self {
            directive: Directive::Save,
            view,
        }
    }

    pub(crate) fn undo() -> Self {
        Self {
            directive: Directive::Undo,
            view: View::Show,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::new_game;

    #[test]
    fn test_new_game_reaches_actions_phase() {
        let game = new_game(1);
        assert_eq!(game.phase, Phase::Actions);
        assert_eq!(game.turn, 1);
        assert_eq!(game.round, 1);
        assert_eq!(game.acting, Some(game.order[0]));
        assert_eq!(game.multi_action, MultiAction::None);
        assert!(game.players.iter().all(|p| !p.performed_action));
    }

    #[test]
    fn test_setup_log_lines() {
        let game = new_game(2);
        let lines = game.render_log();
        assert!(lines[0].ends_with("received 1 wood, 1 metal, 1 tool, 1 oil, 1 gold, and 2 workers."));
        assert!(lines.iter().any(|l| l == "Starting Turn 1"));
    }

    #[test]
    fn test_json_snapshot_round_trip() {
        let game = new_game(3);
        let json = game.to_json().expect("serialize");
        let back = Game::from_json(&json).expect("deserialize");
        assert_eq!(back, game);
    }

    #[test]
    fn test_malformed_snapshot_is_integrity_error() {
        assert!(Game::from_json("{\"turn\": 1}").is_err());

        let mut snapshot: serde_json::Value =
            serde_json::from_str(&new_game(4).to_json().unwrap()).unwrap();
        snapshot["order"] = serde_json::json!([0, 1, 7]);
        assert!(Game::from_json(&snapshot.to_string()).is_err());

        snapshot["order"] = serde_json::json!([0, 0, 1]);
        let err = Game::from_json(&snapshot.to_string()).unwrap_err();
        assert!(err.to_string().contains("not a permutation"));

        snapshot["order"] = serde_json::json!([2, 0, 1]);
        snapshot["acting"] = serde_json::json!(9);
        assert!(Game::from_json(&snapshot.to_string()).is_err());

        snapshot["acting"] = serde_json::json!(1);
        assert!(Game::from_json(&snapshot.to_string()).is_ok());
    }
}
