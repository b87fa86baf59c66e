//! Empire scoring, city-expansion points, end-game majorities and placements.

use super::super::map::{AreaId, Areas};
use super::super::player::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Points per occupied empire area.
pub const EMPIRE_AREA_POINTS: u32 = 2;
/// Points per occupied Sumer site for the holder of the Nippur city.
pub const NIPPUR_EMPIRE_POINTS: u32 = 3;

/// Points for expanding a city, by total resources spent.
///
/// Only totals 2..=6 are valid; anything else is `None`.
pub fn expansion_points(spent: u32) -> Option<u32> {
    match spent {
        2 => Some(4),
        3 => Some(7),
        4 => Some(10),
        5 => Some(14),
        6 => Some(20),
        _ => None,
    }
}

/// Result of empire scoring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmpireScores {
    /// `(area, owner, points)` for every occupied area.
    pub per_area: Vec<(AreaId, PlayerId, u32)>,
    /// Points per player id.
    pub totals: [u32; 3],
}

/// Scores every occupied map area for its army owner.
///
/// Reads the board only; ownership is never changed.
#[instrument(skip(areas))]
pub fn score_empires(areas: &Areas) -> EmpireScores {
    let nippur = areas.get(AreaId::Nippur).city_owner();
    let mut scores = EmpireScores::default();
    for id in AreaId::map_areas() {
        if let Some(owner) = areas.get(id).army_owner() {
            let points = if id.is_sumer() && nippur == Some(owner) {
                NIPPUR_EMPIRE_POINTS
            } else {
                EMPIRE_AREA_POINTS
            };
            scores.per_area.push((id, owner, points));
            scores.totals[owner.index()] += points;
        }
    }
    debug!(totals = ?scores.totals, "Empires scored");
    scores
}

/// Awards each scoring area to the player with the strict worker majority.
#[instrument(skip(areas))]
pub fn end_game_awards(areas: &Areas) -> Vec<(AreaId, PlayerId, u32)> {
    AreaId::scoring_areas()
        .filter_map(|id| {
            let area = areas.get(id);
            PlayerId::all()
                .into_iter()
                .find(|&p| area.has_most_workers(p))
                .map(|p| (id, p, id.score()))
        })
        .collect()
}

/// Groups players into placements by descending score; ties share a place.
///
/// Within a tie, players keep their turn-order position.
#[instrument]
pub fn rank_players(order: [PlayerId; 3], scores: [u32; 3]) -> Vec<Vec<PlayerId>> {
    let mut sorted = order;
    sorted.sort_by(|a, b| scores[b.index()].cmp(&scores[a.index()]));
    let mut places: Vec<Vec<PlayerId>> = Vec::new();
    for p in sorted {
        match places.last_mut() {
            Some(tier) if scores[tier[0].index()] == scores[p.index()] => tier.push(p),
            _ => places.push(vec![p]),
        }
    }
    places
}

/// Win or draw between two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairOutcome {
    /// The first player placed ahead.
    Win,
    /// Equal scores.
    Draw,
}

/// One pairwise result for rating computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairResult {
    /// Player placed ahead (or either, on a draw).
    pub first: PlayerId,
    /// Other player.
    pub second: PlayerId,
    /// Outcome from `first`'s point of view.
    pub outcome: PairOutcome,
}

impl PairResult {
    /// Score for `first`: 1 for a win, 0.5 for a draw.
    pub fn first_score(&self) -> f64 {
        match self.outcome {
            PairOutcome::Win => 1.0,
            PairOutcome::Draw => 0.5,
        }
    }

    /// Score for `second`: 0 for a loss, 0.5 for a draw.
    pub fn second_score(&self) -> f64 {
        1.0 - self.first_score()
    }
}

/// Every pairwise result implied by the placements.
#[instrument(skip(places))]
pub fn pair_results(places: &[Vec<PlayerId>]) -> Vec<PairResult> {
    let flat: Vec<(usize, PlayerId)> = places
        .iter()
        .enumerate()
        .flat_map(|(rank, tier)| tier.iter().map(move |&p| (rank, p)))
        .collect();
    let mut results = Vec::new();
    for (i, &(rank_a, a)) in flat.iter().enumerate() {
        for &(rank_b, b) in &flat[i + 1..] {
            let outcome = if rank_a == rank_b {
                PairOutcome::Draw
            } else {
                PairOutcome::Win
            };
            results.push(PairResult {
                first: a,
                second: b,
                outcome,
            });
        }
    }
    results
}
