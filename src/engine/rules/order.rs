//! Turn-order bidding.

use super::super::player::PlayerId;
use tracing::instrument;

/// Re-sorts the turn order by descending bid value.
///
/// Equal bids keep their prior relative order. `bids` is indexed by player id.
#[instrument]
pub fn sort_by_bid(order: [PlayerId; 3], bids: [u32; 3]) -> [PlayerId; 3] {
    let mut sorted = order;
    // slice::sort_by is stable
    sorted.sort_by(|a, b| bids[b.index()].cmp(&bids[a.index()]));
    sorted
}
