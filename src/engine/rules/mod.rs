//! Turn-resolution rules.
//!
//! Pure functions over board and player values: they assume their inputs were
//! already validated and never fail.

pub mod auto_pass;
pub mod combat;
pub mod order;
pub mod scoring;

pub use auto_pass::{can_auto_pass, can_auto_vp_pass};
pub use combat::{BattleReport, resolve_battle, success_threshold};
pub use order::sort_by_bid;
pub use scoring::{
    EmpireScores, PairOutcome, PairResult, end_game_awards, expansion_points, pair_results,
    rank_players, score_empires,
};
