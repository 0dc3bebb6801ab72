//! Persisted records: the game root, the board (territories and continents)
//! and the roster of players.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::RiskError;

#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Game {
    pub game_id: u64,
    pub creator: Pubkey,
    pub current_player: Pubkey,
    pub turn: u32,
    pub status: GameStatus,
    pub phase: TurnPhase,
    pub card_sets_traded: u16,
    /// Dice of the most recent attack. Display only, never read by the rules.
    pub last_combat: Option<CombatResult>,
    pub pending_reinforcements: Option<u16>,
    pub fortified_this_turn: bool,
    pub winner: Option<Pubkey>,
    pub config: GameConfig,
    pub rng_seed: [u8; 32],
    pub rng_nonce: u64,
    pub bump: u8,
}

impl Game {
    pub const INIT_SPACE: usize = 8
        + 32
        + 32
        + 4
        + 1
        + 1
        + 2
        + (1 + CombatResult::INIT_SPACE)
        + (1 + 2)
        + 1
        + (1 + 32)
        + GameConfig::INIT_SPACE
        + 32
        + 8
        + 1;

    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub max_players: u8,
    /// Key allowed to mix external randomness into the game seed.
    pub rng_provider: Pubkey,
}

impl GameConfig {
    pub const INIT_SPACE: usize = 1 + 32;
}

#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Board {
    pub game: Pubkey,
    pub territories: Vec<Territory>,
    pub continents: Vec<Continent>,
    pub bump: u8,
}

impl Board {
    pub const INIT_SPACE: usize = 32
        + 4
        + (Territory::INIT_SPACE * MAX_TERRITORIES)
        + 4
        + (Continent::INIT_SPACE * MAX_CONTINENTS)
        + 1;

    pub fn territory(&self, id: u8) -> Result<&Territory> {
        self.territories
            .get(id as usize)
            .ok_or_else(|| error!(RiskError::InvalidTerritory))
    }

    pub fn territory_mut(&mut self, id: u8) -> Result<&mut Territory> {
        self.territories
            .get_mut(id as usize)
            .ok_or_else(|| error!(RiskError::InvalidTerritory))
    }

    pub fn continent(&self, id: u8) -> Result<&Continent> {
        self.continents
            .get(id as usize)
            .ok_or_else(|| error!(RiskError::InvalidContinent))
    }

    pub fn continent_bonus(&self, id: u8) -> Result<u8> {
        Ok(self.continent(id)?.bonus_armies)
    }

    pub fn owned_count(&self, owner: &Pubkey) -> usize {
        self.territories
            .iter()
            .filter(|t| t.is_owned_by(owner))
            .count()
    }

    pub fn owns_all(&self, owner: &Pubkey) -> bool {
        !self.territories.is_empty() && self.territories.iter().all(|t| t.is_owned_by(owner))
    }

    pub fn owns_continent(&self, owner: &Pubkey, continent: &Continent) -> bool {
        continent.territories.iter().all(|&id| {
            self.territories
                .get(id as usize)
                .map_or(false, |t| t.is_owned_by(owner))
        })
    }

    /// Troops that still fit on `owner`'s territories, saturated at `u16::MAX`.
    pub fn headroom(&self, owner: &Pubkey) -> u16 {
        let room: u64 = self
            .territories
            .iter()
            .filter(|t| t.is_owned_by(owner))
            .map(|t| u64::from(u16::MAX - t.troops))
            .sum();
        u16::try_from(room).unwrap_or(u16::MAX)
    }

    pub fn total_troops(&self) -> u64 {
        self.territories.iter().map(|t| u64::from(t.troops)).sum()
    }

    /// Checks the static structure supplied at initialization: dense ids,
    /// symmetric adjacency without self loops, and continents that
    /// partition the territory set.
    pub fn validate_layout(&self) -> Result<()> {
        let count = self.territories.len();
        require!(
            (1..=MAX_TERRITORIES).contains(&count),
            RiskError::InvalidMap
        );
        require!(
            (1..=MAX_CONTINENTS).contains(&self.continents.len()),
            RiskError::InvalidMap
        );

        for (index, territory) in self.territories.iter().enumerate() {
            require!(territory.id as usize == index, RiskError::InvalidMap);
            require!(
                territory.owner.is_none() && territory.troops == 0,
                RiskError::InvalidMap
            );
            require!(
                territory.adjacent.len() <= MAX_ADJACENT,
                RiskError::InvalidMap
            );
            require!(
                (territory.continent_id as usize) < self.continents.len(),
                RiskError::InvalidMap
            );
            for (position, &neighbor) in territory.adjacent.iter().enumerate() {
                require!(
                    (neighbor as usize) < count && neighbor != territory.id,
                    RiskError::InvalidMap
                );
                require!(
                    !territory.adjacent[..position].contains(&neighbor),
                    RiskError::InvalidMap
                );
                require!(
                    self.territories[neighbor as usize].is_adjacent(territory.id),
                    RiskError::InvalidMap
                );
            }
        }

        let mut assigned = vec![false; count];
        for (index, continent) in self.continents.iter().enumerate() {
            require!(continent.id as usize == index, RiskError::InvalidMap);
            require!(!continent.territories.is_empty(), RiskError::InvalidMap);
            for &member in &continent.territories {
                let slot = assigned
                    .get_mut(member as usize)
                    .ok_or_else(|| error!(RiskError::InvalidMap))?;
                require!(!*slot, RiskError::InvalidMap);
                require!(
                    self.territories[member as usize].continent_id == continent.id,
                    RiskError::InvalidMap
                );
                *slot = true;
            }
        }
        require!(assigned.iter().all(|&seen| seen), RiskError::InvalidMap);
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct Territory {
    pub id: u8,
    pub continent_id: u8,
    pub owner: Option<Pubkey>,
    pub troops: u16,
    pub adjacent: Vec<u8>,
}

impl Territory {
    pub const INIT_SPACE: usize = 1 + 1 + (1 + 32) + 2 + 4 + MAX_ADJACENT;

    pub fn is_owned_by(&self, owner: &Pubkey) -> bool {
        self.owner.as_ref() == Some(owner)
    }

    pub fn is_adjacent(&self, other: u8) -> bool {
        self.adjacent.contains(&other)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct Continent {
    pub id: u8,
    pub territories: Vec<u8>,
    pub bonus_armies: u8,
}

impl Continent {
    pub const INIT_SPACE: usize = 1 + 4 + MAX_TERRITORIES + 1;
}

#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Roster {
    pub game: Pubkey,
    /// Seating order; turns rotate through this list.
    pub players: Vec<PlayerState>,
    pub bump: u8,
}

impl Roster {
    pub const INIT_SPACE: usize = 32 + 4 + (PlayerState::INIT_SPACE * MAX_PLAYERS) + 1;

    pub fn position(&self, key: &Pubkey) -> Option<usize> {
        self.players.iter().position(|p| p.key == *key)
    }

    pub fn player(&self, key: &Pubkey) -> Result<&PlayerState> {
        self.players
            .iter()
            .find(|p| p.key == *key)
            .ok_or_else(|| error!(RiskError::PlayerNotFound))
    }

    pub fn player_mut(&mut self, key: &Pubkey) -> Result<&mut PlayerState> {
        self.players
            .iter_mut()
            .find(|p| p.key == *key)
            .ok_or_else(|| error!(RiskError::PlayerNotFound))
    }

    pub fn is_color_taken(&self, color: PlayerColor) -> bool {
        self.players.iter().any(|p| p.color == color)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub key: Pubkey,
    pub color: PlayerColor,
    pub cards: Vec<Card>,
    pub conquered_territory_this_turn: bool,
}

impl PlayerState {
    pub const INIT_SPACE: usize = 32 + 1 + 4 + (Card::INIT_SPACE * MAX_HAND_SIZE) + 1;

    pub fn new(key: Pubkey, color: PlayerColor) -> Self {
        Self {
            key,
            color,
            cards: Vec::new(),
            conquered_territory_this_turn: false,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub card_type: CardType,
    pub territory_id: Option<u8>,
}

impl Card {
    pub const INIT_SPACE: usize = 1 + (1 + 1);
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardType {
    Infantry,
    Cavalry,
    Artillery,
    Wild,
}

/// Troops to add to one territory during Reinforcement.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub territory_id: u8,
    pub troops: u16,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct CombatResult {
    pub attacker_rolls: Vec<u8>,
    pub defender_rolls: Vec<u8>,
    pub attacker_losses: u8,
    pub defender_losses: u8,
    pub conquered: bool,
}

impl CombatResult {
    pub const INIT_SPACE: usize =
        4 + MAX_ATTACK_DICE as usize + 4 + MAX_DEFENSE_DICE as usize + 1 + 1 + 1;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    Setup,
    InProgress,
    Completed,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    #[default]
    Reinforcement,
    Attack,
    Fortification,
}

impl TurnPhase {
    pub fn next(self) -> Self {
        match self {
            TurnPhase::Reinforcement => TurnPhase::Attack,
            TurnPhase::Attack => TurnPhase::Fortification,
            TurnPhase::Fortification => TurnPhase::Reinforcement,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum PlayerColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl std::str::FromStr for PlayerColor {
    type Err = RiskError;

    fn from_str(color: &str) -> std::result::Result<Self, Self::Err> {
        match color.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(PlayerColor::Red),
            "blue" => Ok(PlayerColor::Blue),
            "green" => Ok(PlayerColor::Green),
            "yellow" => Ok(PlayerColor::Yellow),
            "purple" => Ok(PlayerColor::Purple),
            "orange" => Ok(PlayerColor::Orange),
            _ => Err(RiskError::InvalidColor),
        }
    }
}
