//! Rule constants and account sizing limits.

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

pub const MAX_TERRITORIES: usize = 64;
pub const MAX_CONTINENTS: usize = 16;
pub const MAX_ADJACENT: usize = 10;

pub const INITIAL_TROOPS_PER_TERRITORY: u16 = 3;

pub const MIN_REINFORCEMENTS: u16 = 3;
pub const TERRITORIES_PER_REINFORCEMENT: u16 = 3;

pub const MAX_ATTACK_DICE: u8 = 3;
pub const MAX_DEFENSE_DICE: u8 = 2;
pub const DIE_FACES: u64 = 6;

pub const CARD_SET_SIZE: usize = 3;
/// A player holding this many cards must trade before leaving Reinforcement.
pub const TRADE_REQUIRED_HAND_SIZE: usize = 5;
pub const MAX_HAND_SIZE: usize = 6;

/// Bonus armies for the first sets traded in a game. Later sets grow by
/// [`TRADE_BONUS_STEP`] each.
pub const TRADE_BONUS_SCHEDULE: [u16; 6] = [4, 6, 8, 10, 12, 15];
pub const TRADE_BONUS_STEP: u16 = 5;
pub const TRADE_TERRITORY_BONUS: u16 = 2;

/// Wild cards in the virtual deck, alongside one card per territory.
pub const WILD_CARDS_IN_DECK: u64 = 2;
