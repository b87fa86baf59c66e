//! Dice-based invasion combat.

use super::super::dice::Dice;
use super::super::log::Roll;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Roll needed when the defender is not stronger.
pub const BASE_THRESHOLD: u8 = 5;
/// Roll needed against a stronger defender.
pub const STRONG_DEFENDER_THRESHOLD: u8 = 7;

/// Minimum two-dice total the attacker needs.
#[instrument]
pub fn success_threshold(attacker_rating: u32, defender_rating: u32) -> u8 {
    if defender_rating > attacker_rating {
        STRONG_DEFENDER_THRESHOLD
    } else {
        BASE_THRESHOLD
    }
}

/// Outcome of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct BattleReport {
    rolls: Vec<Roll>,
    attacker_lost: u32,
    defender_lost: u32,
    attacker_left: u32,
    defender_left: u32,
}

impl BattleReport {
    /// True if the defender's area was emptied.
    pub fn cleared(&self) -> bool {
        self.defender_left == 0
    }

    /// Number of dice rounds fought.
    pub fn rounds(&self) -> u32 {
        self.rolls.len() as u32
    }
}

/// Fights until the attacker runs out of armies or the area is emptied.
///
/// Each round rolls two dice: a total at or above `threshold` removes one
/// defending army, anything lower removes one attacking army.
#[instrument(skip(dice))]
pub fn resolve_battle(
    attacker: u32,
    defender: u32,
    threshold: u8,
    dice: &mut dyn Dice,
) -> BattleReport {
    let mut report = BattleReport {
        rolls: Vec::new(),
        attacker_lost: 0,
        defender_lost: 0,
        attacker_left: attacker,
        defender_left: defender,
    };

    while report.attacker_left > 0 && report.defender_left > 0 {
        let roll = Roll(dice.roll(), dice.roll());
        if roll.total() >= threshold {
            report.defender_left -= 1;
            report.defender_lost += 1;
        } else {
            report.attacker_left -= 1;
            report.attacker_lost += 1;
        }
        debug!(total = roll.total(), threshold, "Combat roll");
        report.rolls.push(roll);
    }

    info!(
        attacker_lost = report.attacker_lost,
        defender_lost = report.defender_lost,
        cleared = report.cleared(),
        "Battle resolved"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dice::{ScriptedDice, SeededDice};

    #[test]
    fn test_threshold_rises_against_stronger_defender() {
        assert_eq!(success_threshold(3, 3), 5);
        assert_eq!(success_threshold(3, 2), 5);
        assert_eq!(success_threshold(2, 3), 7);
    }

    #[test]
    fn test_attacker_wins_with_high_rolls() {
        let mut dice = ScriptedDice::new([6, 6, 3, 2, 4, 1]);
        let report = resolve_battle(3, 2, 5, &mut dice);
        // 12 hits, 5 hits
        assert_eq!(report.rolls().len(), 2);
        assert!(report.cleared());
        assert_eq!(*report.attacker_left(), 3);
    }

    #[test]
    fn test_attacker_repelled_with_low_rolls() {
        let mut dice = ScriptedDice::new([1, 1]);
        let report = resolve_battle(2, 1, 5, &mut dice);
        assert!(!report.cleared());
        assert_eq!(*report.attacker_left(), 0);
        assert_eq!(*report.attacker_lost(), 2);
    }

    #[test]
    fn test_battle_conserves_armies_for_many_seeds() {
        for seed in 0..200 {
            let mut dice = SeededDice::new(seed);
            let (a, d) = (1 + (seed % 7) as u32, 1 + (seed % 5) as u32);
            let r = resolve_battle(a, d, 7, &mut dice);
            assert_eq!(r.attacker_left() + r.attacker_lost(), a);
            assert_eq!(r.defender_left() + r.defender_lost(), d);
            assert_eq!(r.rounds(), r.attacker_lost() + r.defender_lost());
            assert!(r.rounds() < a + d);
            assert!(*r.attacker_left() == 0 || *r.defender_left() == 0);
        }
    }

    #[test]
    fn test_no_rounds_without_defenders() {
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        let r = resolve_battle(4, 0, 5, &mut dice);
        assert_eq!(r.rounds(), 0);
        assert!(r.cleared());
    }
}
