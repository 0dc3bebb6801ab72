//! Risk cards: awards, set validation and the escalating trade schedule.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::RiskError;
use crate::rng::Entropy;
use crate::state::{Card, CardType};

/// Draws from a virtual classic deck with replacement: one card per
/// territory, typed Infantry/Cavalry/Artillery by territory id, plus
/// [`WILD_CARDS_IN_DECK`] wilds.
pub fn draw_card(rng: &mut impl Entropy, territory_count: usize) -> Card {
    let index = rng.below(territory_count as u64 + WILD_CARDS_IN_DECK);
    if index >= territory_count as u64 {
        return Card {
            card_type: CardType::Wild,
            territory_id: None,
        };
    }
    let card_type = match index % 3 {
        0 => CardType::Infantry,
        1 => CardType::Cavalry,
        _ => CardType::Artillery,
    };
    Card {
        card_type,
        territory_id: Some(index as u8),
    }
}

/// Three of a kind or one of each, with wilds standing in for any type.
pub fn is_valid_set(cards: &[Card]) -> bool {
    if cards.len() != CARD_SET_SIZE {
        return false;
    }
    let mut named: Vec<CardType> = cards
        .iter()
        .map(|c| c.card_type)
        .filter(|t| *t != CardType::Wild)
        .collect();
    let all_same = named.windows(2).all(|pair| pair[0] == pair[1]);
    named.sort_unstable_by_key(|t| *t as u8);
    named.dedup();
    let all_distinct = named.len() == cards.len() - wild_count(cards);
    all_same || all_distinct
}

fn wild_count(cards: &[Card]) -> usize {
    cards.iter().filter(|c| c.card_type == CardType::Wild).count()
}

/// Bonus armies for the next set, given how many sets the game has seen.
pub fn trade_bonus(sets_traded: u16) -> u16 {
    match TRADE_BONUS_SCHEDULE.get(sets_traded as usize) {
        Some(&bonus) => bonus,
        None => {
            let last = TRADE_BONUS_SCHEDULE[TRADE_BONUS_SCHEDULE.len() - 1];
            let beyond = sets_traded - (TRADE_BONUS_SCHEDULE.len() as u16 - 1);
            last.saturating_add(beyond.saturating_mul(TRADE_BONUS_STEP))
        }
    }
}

/// Resolves `indices` against `hand` and checks the selection is a
/// tradeable set. The hand is left untouched.
pub fn select_set(hand: &[Card], indices: &[u8]) -> Result<Vec<Card>> {
    require!(indices.len() == CARD_SET_SIZE, RiskError::InvalidCardSet);
    for (position, &index) in indices.iter().enumerate() {
        require!((index as usize) < hand.len(), RiskError::InvalidCardIndex);
        require!(
            !indices[..position].contains(&index),
            RiskError::InvalidCardIndex
        );
    }
    let cards: Vec<Card> = indices.iter().map(|&i| hand[i as usize]).collect();
    require!(is_valid_set(&cards), RiskError::InvalidCardSet);
    Ok(cards)
}

/// Removes distinct, in-range `indices` from `hand`.
pub fn remove_from_hand(hand: &mut Vec<Card>, indices: &[u8]) {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    for index in sorted {
        hand.remove(index as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn card(card_type: CardType) -> Card {
        Card {
            card_type,
            territory_id: None,
        }
    }

    use CardType::*;

    #[test]
    fn three_of_a_kind_and_one_of_each_are_sets() {
        assert!(is_valid_set(&[card(Infantry), card(Infantry), card(Infantry)]));
        assert!(is_valid_set(&[card(Infantry), card(Cavalry), card(Artillery)]));
    }

    #[test]
    fn mixed_pairs_are_not_sets() {
        assert!(!is_valid_set(&[card(Infantry), card(Infantry), card(Cavalry)]));
        assert!(!is_valid_set(&[card(Artillery), card(Cavalry), card(Cavalry)]));
    }

    #[test]
    fn wilds_fill_any_gap() {
        assert!(is_valid_set(&[card(Wild), card(Infantry), card(Cavalry)]));
        assert!(is_valid_set(&[card(Infantry), card(Wild), card(Infantry)]));
        assert!(is_valid_set(&[card(Wild), card(Wild), card(Artillery)]));
        assert!(is_valid_set(&[card(Wild), card(Wild), card(Wild)]));
    }

    #[test]
    fn set_needs_exactly_three_cards() {
        assert!(!is_valid_set(&[card(Infantry), card(Infantry)]));
        assert!(!is_valid_set(&[card(Wild); 4]));
    }

    #[test]
    fn schedule_escalates_then_steps_by_five() {
        let bonuses: Vec<u16> = (0..9).map(trade_bonus).collect();
        assert_eq!(bonuses, vec![4, 6, 8, 10, 12, 15, 20, 25, 30]);
        assert_eq!(trade_bonus(u16::MAX), u16::MAX);
    }

    #[test]
    fn selection_rejects_bad_indices() {
        let hand = vec![card(Infantry), card(Infantry), card(Infantry), card(Cavalry)];
        assert!(select_set(&hand, &[0, 1]).is_err());
        assert!(select_set(&hand, &[0, 1, 4]).is_err());
        assert!(select_set(&hand, &[0, 0, 1]).is_err());
        assert!(select_set(&hand, &[0, 1, 3]).is_err());
        assert_eq!(select_set(&hand, &[2, 0, 1]).map(|c| c.len()).ok(), Some(3));
    }

    #[test]
    fn removal_keeps_the_rest_of_the_hand() {
        let mut hand = vec![card(Infantry), card(Cavalry), card(Wild), card(Artillery)];
        remove_from_hand(&mut hand, &[0, 3, 2]);
        assert_eq!(hand, vec![card(Cavalry)]);
    }

    #[test]
    fn drawn_cards_match_the_deck_layout() {
        let mut rng = SeededRng::new([5u8; 32], 0);
        for _ in 0..200 {
            let drawn = draw_card(&mut rng, 6);
            match drawn.territory_id {
                Some(id) => {
                    assert!(id < 6);
                    let expected = [Infantry, Cavalry, Artillery][id as usize % 3];
                    assert_eq!(drawn.card_type, expected);
                }
                None => assert_eq!(drawn.card_type, Wild),
            }
        }
    }
}
