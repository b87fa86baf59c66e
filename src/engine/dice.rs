//! Six-sided dice for invasion combat.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of d6 results.
pub trait Dice {
    /// Rolls one die, 1..=6.
    fn roll(&mut self) -> u8;
}

/// Dice backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    /// Deterministic dice from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Dice seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self) -> u8 {
        self.rng.random_range(1..=6)
    }
}

/// Replays a fixed sequence, then repeats the last value (or 1 if empty).
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    queue: VecDeque<u8>,
    last: u8,
}

impl ScriptedDice {
    /// Dice that will produce `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            queue: rolls.into_iter().map(|r| r.clamp(1, 6)).collect(),
            last: 1,
        }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        if let Some(r) = self.queue.pop_front() {
            self.last = r;
        }
        self.last
    }
}
