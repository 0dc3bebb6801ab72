use anchor_lang::prelude::*;

use crate::state::Board;

/// Like [`are_territories_connected`], but unknown ids are an error rather
/// than simply unreachable.
pub fn check_connected(board: &Board, start: u8, end: u8, owner: &Pubkey) -> Result<bool> {
    board.territory(start)?;
    board.territory(end)?;
    Ok(are_territories_connected(board, start, end, owner))
}

/// Whether `end` can be reached from `start` by stepping only through
/// territories held by `owner`.
pub fn are_territories_connected(board: &Board, start: u8, end: u8, owner: &Pubkey) -> bool {
    let count = board.territories.len();
    if start as usize >= count || end as usize >= count {
        return false;
    }
    if !board.territories[start as usize].is_owned_by(owner) {
        return false;
    }

    let mut visited = vec![false; count];
    let mut stack = vec![start];
    visited[start as usize] = true;

    while let Some(current) = stack.pop() {
        if current == end {
            return true;
        }
        for &next in &board.territories[current as usize].adjacent {
            let Some(territory) = board.territories.get(next as usize) else {
                continue;
            };
            if !visited[next as usize] && territory.is_owned_by(owner) {
                visited[next as usize] = true;
                stack.push(next);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Continent, Territory};

    /// 0 - 1 - 2 - 3 - 4 in a line.
    fn line(owners: &[Pubkey]) -> Board {
        let len = owners.len() as u8;
        let territories = (0..len)
            .map(|id| {
                let mut adjacent = Vec::new();
                if id > 0 {
                    adjacent.push(id - 1);
                }
                if id + 1 < len {
                    adjacent.push(id + 1);
                }
                Territory {
                    id,
                    continent_id: 0,
                    owner: Some(owners[id as usize]),
                    troops: 1,
                    adjacent,
                }
            })
            .collect();
        Board {
            territories,
            continents: vec![Continent {
                id: 0,
                territories: (0..len).collect(),
                bonus_armies: 0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn path_through_own_territory_connects() {
        let a = Pubkey::new_unique();
        let board = line(&[a, a, a, a, a]);
        assert!(are_territories_connected(&board, 0, 4, &a));
        assert!(are_territories_connected(&board, 4, 0, &a));
    }

    #[test]
    fn enemy_territory_breaks_the_path() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let board = line(&[a, a, b, a, a]);
        assert!(are_territories_connected(&board, 0, 1, &a));
        assert!(!are_territories_connected(&board, 0, 4, &a));
        assert!(!are_territories_connected(&board, 0, 2, &a));
    }

    #[test]
    fn start_must_belong_to_owner() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let board = line(&[b, a, a]);
        assert!(!are_territories_connected(&board, 0, 2, &a));
    }

    #[test]
    fn territory_reaches_itself() {
        let a = Pubkey::new_unique();
        let board = line(&[a, a]);
        assert!(are_territories_connected(&board, 1, 1, &a));
    }

    #[test]
    fn checked_query_rejects_unknown_ids() {
        let a = Pubkey::new_unique();
        let board = line(&[a, a, a]);
        assert_eq!(check_connected(&board, 0, 2, &a).ok(), Some(true));
        assert!(check_connected(&board, 0, 3, &a).is_err());
        assert!(check_connected(&board, 200, 0, &a).is_err());
    }

    #[test]
    fn out_of_range_ids_are_unreachable() {
        let a = Pubkey::new_unique();
        let board = line(&[a, a]);
        assert!(!are_territories_connected(&board, 0, 9, &a));
        assert!(!are_territories_connected(&board, 9, 0, &a));
    }
}
