//! Dice combat between two adjacent territories.
//!
//! Both sides roll, sort descending and compare pairwise. The defender wins
//! ties. Each lost comparison costs the loser one troop.

use crate::constants::MAX_DEFENSE_DICE;
use crate::rng::Entropy;
use crate::state::CombatResult;

pub fn defender_dice(defending_troops: u16) -> u8 {
    defending_troops.min(u16::from(MAX_DEFENSE_DICE)) as u8
}

pub fn roll(rng: &mut impl Entropy, count: u8) -> Vec<u8> {
    let mut dice: Vec<u8> = (0..count).map(|_| rng.roll_die()).collect();
    dice.sort_unstable_by(|a, b| b.cmp(a));
    dice
}

/// Returns `(attacker_losses, defender_losses)` for dice already sorted
/// descending.
pub fn compare(attacker: &[u8], defender: &[u8]) -> (u8, u8) {
    attacker
        .iter()
        .zip(defender)
        .fold((0, 0), |(attacker_losses, defender_losses), (a, d)| {
            if a > d {
                (attacker_losses, defender_losses + 1)
            } else {
                (attacker_losses + 1, defender_losses)
            }
        })
}

pub fn resolve(rng: &mut impl Entropy, attacking_dice: u8, defending_troops: u16) -> CombatResult {
    let attacker_rolls = roll(rng, attacking_dice);
    let defender_rolls = roll(rng, defender_dice(defending_troops));
    let (attacker_losses, defender_losses) = compare(&attacker_rolls, &defender_rolls);
    CombatResult {
        attacker_rolls,
        defender_rolls,
        attacker_losses,
        defender_losses,
        conquered: false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::rng::testing::FixedRolls;

    #[test]
    fn defender_wins_ties() {
        assert_eq!(compare(&[6], &[6]), (1, 0));
        assert_eq!(compare(&[5, 3], &[5, 3]), (2, 0));
    }

    #[test]
    fn only_matched_pairs_are_compared() {
        assert_eq!(compare(&[6, 5, 4], &[3]), (0, 1));
        assert_eq!(compare(&[2], &[6, 6]), (1, 0));
        assert_eq!(compare(&[6, 2, 1], &[5, 4]), (1, 1));
    }

    #[test]
    fn defender_rolls_at_most_two() {
        assert_eq!(defender_dice(1), 1);
        assert_eq!(defender_dice(2), 2);
        assert_eq!(defender_dice(40), 2);
    }

    #[test]
    fn rolls_are_sorted_before_comparison() {
        let mut rng = FixedRolls::new(&[2, 6, 4, 1, 5]);
        let result = resolve(&mut rng, 3, 5);
        assert_eq!(result.attacker_rolls, vec![6, 4, 2]);
        assert_eq!(result.defender_rolls, vec![5, 1]);
        assert_eq!((result.attacker_losses, result.defender_losses), (0, 2));
        assert!(!result.conquered);
    }

    proptest! {
        #[test]
        fn losses_match_compared_pairs(
            attacker in prop::collection::vec(1u8..=6, 1..=3),
            defender in prop::collection::vec(1u8..=6, 1..=2),
        ) {
            let mut attacker = attacker;
            let mut defender = defender;
            attacker.sort_unstable_by(|a, b| b.cmp(a));
            defender.sort_unstable_by(|a, b| b.cmp(a));
            let (lost_a, lost_d) = compare(&attacker, &defender);
            prop_assert_eq!(
                usize::from(lost_a + lost_d),
                attacker.len().min(defender.len())
            );
        }
    }
}
