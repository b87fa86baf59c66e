//! Auto-pass detection.

use super::super::player::Player;
use super::super::resources::Resource;
use tracing::{debug, instrument};

/// Whether a player in the Actions phase passes without being asked.
///
/// Always false: only the city-expansion round auto-resolves.
#[instrument(skip(player), fields(player = %player.id()))]
pub fn can_auto_pass(player: &Player) -> bool {
    false
}

/// Whether a player skips the city-expansion round.
///
/// A player expands only while holding more expansion tokens than city tokens
/// (an unexpanded city on the board) and at least two wood.
#[instrument(skip(player), fields(player = %player.id()))]
pub fn can_auto_vp_pass(player: &Player) -> bool {
    let eligible = player.expansions() > player.cities() && player.resources().get(Resource::Wood) >= 2;
    debug!(eligible, "Expansion eligibility");
    !eligible
}
