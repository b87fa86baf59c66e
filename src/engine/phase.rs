//! Top-level phases and the in-phase multi-step action marker.

use serde::{Deserialize, Serialize};

/// Stage of the game. `GameOver` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum Phase {
    /// Players and board being dealt.
    Setup,
    /// Opening announcement.
    StartGame,
    /// Automatic collection at the start of each turn.
    StartTurn,
    /// Players submit discretionary actions.
    Actions,
    /// Turn order is re-sorted by bid.
    #[strum(to_string = "Order Of Play")]
    OrderOfPlay,
    /// Occupied empire areas score.
    #[strum(to_string = "Score Empire")]
    ScoreEmpire,
    /// Players may expand one city each.
    #[strum(to_string = "Expand City")]
    ExpandCity,
    /// Board cleared and supplies refilled.
    #[strum(to_string = "End Of Turn")]
    EndOfTurn,
    /// Final worker-majority scoring.
    #[strum(to_string = "End Game")]
    EndGame,
    /// Winners recorded.
    #[strum(to_string = "Announce Winners")]
    AnnounceWinners,
    /// Nothing further happens.
    #[strum(to_string = "Game Over")]
    GameOver,
}

impl Phase {
    /// True once no more input is accepted.
    pub fn is_terminal(self) -> bool {
        self == Phase::GameOver
    }

    /// True for the phases that wait on player input.
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::Actions | Phase::ExpandCity)
    }
}

/// Marker for a multi-submission action in progress during [`Phase::Actions`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum MultiAction {
    /// No action in progress.
    #[default]
    None,
    /// Empire founded; armies may be bought next.
    StartedEmpire,
    /// Armies bought; equipment next.
    BoughtArmies,
    /// Army equipped; placement (or combat for the empire area) next.
    EquippedArmy,
    /// Armies placed.
    PlacedArmies,
    /// Scribe spent; a worker must be selected.
    UsedScribe,
    /// Worker selected; a destination must be chosen.
    SelectedWorker,
    /// Worker moved by a scribe.
    PlacedWorker,
    /// Resource traded; a tool may be made.
    TradedResource,
    /// Empire expanding; more invasions may follow.
    ExpandEmpire,
    /// City built without a token; another city must be abandoned.
    BuiltCity,
}
