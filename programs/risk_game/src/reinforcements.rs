use anchor_lang::prelude::*;

use crate::constants::{MIN_REINFORCEMENTS, TERRITORIES_PER_REINFORCEMENT};
use crate::state::Board;

/// Troops owed to `player` at the start of their Reinforcement phase:
/// one per three territories (at least three) plus the bonus of every
/// continent they hold entirely.
pub fn calculate_reinforcements(board: &Board, player: &Pubkey) -> u16 {
    let owned = board.owned_count(player) as u16;
    let base = (owned / TERRITORIES_PER_REINFORCEMENT).max(MIN_REINFORCEMENTS);
    board
        .continents
        .iter()
        .filter(|continent| board.owns_continent(player, continent))
        .fold(base, |total, continent| {
            total.saturating_add(u16::from(continent.bonus_armies))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Continent, Territory};

    /// Ten territories split 4/6 over two continents worth 2 and 7.
    fn board() -> Board {
        let territories = (0..10u8)
            .map(|id| Territory {
                id,
                continent_id: if id < 4 { 0 } else { 1 },
                ..Default::default()
            })
            .collect();
        Board {
            territories,
            continents: vec![
                Continent {
                    id: 0,
                    territories: (0..4).collect(),
                    bonus_armies: 2,
                },
                Continent {
                    id: 1,
                    territories: (4..10).collect(),
                    bonus_armies: 7,
                },
            ],
            ..Default::default()
        }
    }

    fn assign(board: &mut Board, owner: Pubkey, ids: impl IntoIterator<Item = u8>) {
        for id in ids {
            board.territories[id as usize].owner = Some(owner);
            board.territories[id as usize].troops = 1;
        }
    }

    #[test]
    fn small_holdings_get_the_minimum() {
        let mut board = board();
        let player = Pubkey::new_unique();
        assign(&mut board, player, [0, 5]);
        assert_eq!(calculate_reinforcements(&board, &player), 3);
    }

    #[test]
    fn continent_bonus_is_added_to_the_base() {
        let mut board = board();
        let player = Pubkey::new_unique();
        let rival = Pubkey::new_unique();
        assign(&mut board, player, 4..10);
        assign(&mut board, rival, 0..4);
        assert_eq!(calculate_reinforcements(&board, &player), 3 + 7);
        assert_eq!(calculate_reinforcements(&board, &rival), 3 + 2);
    }

    #[test]
    fn whole_map_collects_every_bonus() {
        let mut board = board();
        let player = Pubkey::new_unique();
        assign(&mut board, player, 0..10);
        assert_eq!(calculate_reinforcements(&board, &player), 3 + 2 + 7);
    }

    #[test]
    fn partial_continent_earns_nothing() {
        let mut board = board();
        let player = Pubkey::new_unique();
        let rival = Pubkey::new_unique();
        assign(&mut board, player, 1..10);
        assign(&mut board, rival, [0]);
        assert_eq!(calculate_reinforcements(&board, &player), 3 + 7);
    }
}
