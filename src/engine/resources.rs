//! Resource kinds and the fixed-size resource ledger.
//!
//! Players and the shared bank each hold one [`Resources`] vector indexed by
//! [`Resource`]. All arithmetic is checked: a ledger never goes negative.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// The eight resource kinds, in ledger order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Grain.
    Grain,
    /// Wood.
    Wood,
    /// Metal.
    Metal,
    /// Textile.
    Textile,
    /// Tool.
    Tool,
    /// Oil.
    Oil,
    /// Gold.
    Gold,
    /// Lapis lazuli.
    Lapis,
}

/// Number of resource kinds.
pub const RESOURCE_KINDS: usize = 8;

impl Resource {
    /// Position of this kind in a [`Resources`] vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weight of one unit of this kind.
    ///
    /// Used both for the turn-order bid value and for the number of workers
    /// a single spent unit places.
    pub fn value(self) -> u32 {
        match self {
            Resource::Grain => 1,
            Resource::Wood | Resource::Metal | Resource::Textile => 2,
            Resource::Tool | Resource::Oil => 3,
            Resource::Gold => 4,
            Resource::Lapis => 5,
        }
    }

    /// Armies bought by one unit of this kind, if it can buy armies at all.
    pub fn army_value(self) -> Option<u32> {
        match self {
            Resource::Grain => Some(1),
            Resource::Metal => Some(2),
            Resource::Tool => Some(3),
            _ => None,
        }
    }

    /// Grain and textile never run out in the bank.
    pub fn is_unlimited(self) -> bool {
        matches!(self, Resource::Grain | Resource::Textile)
    }
}

/// A count of every resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Resources([u32; RESOURCE_KINDS]);

impl Resources {
    /// An empty ledger.
    pub const fn empty() -> Self {
        Self([0; RESOURCE_KINDS])
    }

    /// Builds a ledger from raw counts in [`Resource`] order.
    pub const fn from_counts(counts: [u32; RESOURCE_KINDS]) -> Self {
        Self(counts)
    }

    /// Contents of the shared bank at game start.
    pub const fn initial_bank() -> Self {
        Self([0, 9, 9, 0, 9, 4, 4, 7])
    }

    /// Resources dealt to every player during setup.
    pub const fn starting_hand() -> Self {
        Self([0, 1, 1, 0, 1, 1, 1, 0])
    }

    /// A ledger holding `count` units of a single kind.
    pub fn single(resource: Resource, count: u32) -> Self {
        let mut rs = Self::empty();
        rs.0[resource.index()] = count;
        rs
    }

    /// Count of one kind.
    pub fn get(&self, resource: Resource) -> u32 {
        self.0[resource.index()]
    }

    /// Overwrites the count of one kind.
    pub fn set(&mut self, resource: Resource, count: u32) {
        self.0[resource.index()] = count;
    }

    /// Adds units of one kind.
    pub fn add(&mut self, resource: Resource, count: u32) {
        self.0[resource.index()] += count;
    }

    /// Raw counts in [`Resource`] order.
    pub fn counts(&self) -> [u32; RESOURCE_KINDS] {
        self.0
    }

    /// Total number of units across all kinds.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// True if every count is zero.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// True if `self` holds at least `other` of every kind.
    pub fn covers(&self, other: &Resources) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(have, need)| have >= need)
    }

    /// Turn-order bid value: sum of weight times quantity.
    #[instrument]
    pub fn bid_value(&self) -> u32 {
        self.iter().map(|(r, n)| r.value() * n).sum()
    }

    /// Iterates `(kind, count)` over every kind, including zero counts.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::iter().map(move |r| (r, self.get(r)))
    }

    /// Iterates only the kinds with a non-zero count.
    pub fn nonzero(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        self.iter().filter(|(_, n)| *n > 0)
    }

    /// Subtracts `other`, failing without mutation if any count would go negative.
    pub fn checked_sub(&mut self, other: &Resources) -> Option<()> {
        if !self.covers(other) {
            return None;
        }
        for (have, take) in self.0.iter_mut().zip(other.0.iter()) {
            *have -= take;
        }
        Some(())
    }

    /// Adds every count of `other`.
    pub fn deposit(&mut self, other: &Resources) {
        for (have, give) in self.0.iter_mut().zip(other.0.iter()) {
            *have += give;
        }
    }

    /// Moves `amount` from `self` into `to`; fails without mutation if `self` is short.
    pub fn transfer_to(&mut self, to: &mut Resources, amount: &Resources) -> Option<()> {
        self.checked_sub(amount)?;
        to.deposit(amount);
        Some(())
    }

    /// Renders the non-zero counts as an English list, e.g. "2 wood, 1 tool, and 1 gold".
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .nonzero()
            .map(|(r, n)| format!("{} {}", n, r))
            .collect();
        to_sentence(&parts)
    }
}

impl From<[u32; RESOURCE_KINDS]> for Resources {
    fn from(counts: [u32; RESOURCE_KINDS]) -> Self {
        Self(counts)
    }
}

/// Joins items as an English list: "a", "a and b", "a, b, and c".
pub fn to_sentence<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_value_weights() {
        let bid = Resources::from_counts([1, 1, 0, 0, 1, 0, 0, 1]);
        assert_eq!(bid.bid_value(), 1 + 2 + 3 + 5);
        assert_eq!(Resources::empty().bid_value(), 0);
    }

    #[test]
    fn test_checked_sub_rejects_overdraw_without_mutation() {
        let mut hand = Resources::starting_hand();
        let before = hand;
        assert!(hand.checked_sub(&Resources::single(Resource::Wood, 2)).is_none());
        assert_eq!(hand, before);
        assert!(hand.checked_sub(&Resources::single(Resource::Wood, 1)).is_some());
        assert_eq!(hand.get(Resource::Wood), 0);
    }

    #[test]
    fn test_describe_lists_nonzero_kinds() {
        let rs = Resources::from_counts([0, 2, 0, 0, 1, 0, 1, 0]);
        assert_eq!(rs.describe(), "2 wood, 1 tool, and 1 gold");
        assert_eq!(Resources::single(Resource::Lapis, 1).describe(), "1 lapis");
    }

    #[test]
    fn test_resource_parses_case_insensitively() {
        assert_eq!("Metal".parse::<Resource>(), Ok(Resource::Metal));
        assert!("bronze".parse::<Resource>().is_err());
    }

    #[test]
    fn test_to_sentence() {
        assert_eq!(to_sentence(&["A"]), "A");
        assert_eq!(to_sentence(&["A", "B"]), "A and B");
        assert_eq!(to_sentence(&["A", "B", "C"]), "A, B, and C");
    }
}
