//! Turn and phase state machine.
//!
//! [`GameSession`] borrows the three records of one game and applies a
//! single instruction to them. Every operation validates all of its
//! preconditions before the first write, so a failed instruction leaves the
//! records exactly as it found them.

use anchor_lang::prelude::*;

use crate::cards;
use crate::combat;
use crate::connectivity::are_territories_connected;
use crate::constants::*;
use crate::error::RiskError;
use crate::reinforcements::calculate_reinforcements;
use crate::rng::{derive_seed, Entropy};
use crate::state::*;

pub struct GameSession<'a> {
    game: &'a mut Game,
    board: &'a mut Board,
    roster: &'a mut Roster,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub combat: CombatResult,
    pub defender: Pubkey,
    /// Troops that moved into the conquered territory.
    pub moved: u16,
    pub card: Option<Card>,
    pub eliminated: Option<Pubkey>,
    pub winner: Option<Pubkey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeOutcome {
    pub bonus: u16,
    pub territory_bonus: Option<u8>,
    pub sets_traded: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub phase: TurnPhase,
    pub turn: u32,
    pub current_player: Pubkey,
    /// Set when a new turn started.
    pub reinforcements: Option<u16>,
}

impl<'a> GameSession<'a> {
    pub fn new(game: &'a mut Game, board: &'a mut Board, roster: &'a mut Roster) -> Self {
        Self {
            game,
            board,
            roster,
        }
    }

    pub fn initialize(
        &mut self,
        creator: Pubkey,
        color: &str,
        max_players: u8,
        rng_provider: Pubkey,
        territories: Vec<Territory>,
        continents: Vec<Continent>,
    ) -> Result<PlayerColor> {
        let color: PlayerColor = color.parse()?;
        require!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&(max_players as usize)),
            RiskError::InvalidPlayerLimit
        );
        require!(
            territories.len() >= max_players as usize,
            RiskError::InvalidMap
        );
        require_keys_neq!(creator, rng_provider, RiskError::Unauthorized);
        let layout = Board {
            territories,
            continents,
            ..Default::default()
        };
        layout.validate_layout()?;

        self.board.territories = layout.territories;
        self.board.continents = layout.continents;

        self.roster.players = vec![PlayerState::new(creator, color)];

        self.game.creator = creator;
        self.game.current_player = creator;
        self.game.turn = 0;
        self.game.status = GameStatus::Setup;
        self.game.phase = TurnPhase::Reinforcement;
        self.game.card_sets_traded = 0;
        self.game.last_combat = None;
        self.game.pending_reinforcements = None;
        self.game.fortified_this_turn = false;
        self.game.winner = None;
        self.game.config = GameConfig {
            max_players,
            rng_provider,
        };
        Ok(color)
    }

    pub fn join(&mut self, player: Pubkey, color: &str) -> Result<PlayerColor> {
        require!(
            self.game.status == GameStatus::Setup,
            RiskError::GameAlreadyStarted
        );
        let color: PlayerColor = color.parse()?;
        require!(
            self.roster.position(&player).is_none(),
            RiskError::AlreadyJoined
        );
        require_keys_neq!(player, self.game.config.rng_provider, RiskError::Unauthorized);
        require!(
            self.roster.players.len() < self.game.config.max_players as usize,
            RiskError::MaxPlayersReached
        );
        require!(
            !self.roster.is_color_taken(color),
            RiskError::ColorAlreadyTaken
        );
        self.roster.players.push(PlayerState::new(player, color));
        Ok(color)
    }

    /// Deals every territory round-robin over a shuffled order and opens the
    /// first turn. Returns the first player's reinforcements.
    pub fn distribute_initial_territories(
        &mut self,
        caller: Pubkey,
        rng: &mut impl Entropy,
    ) -> Result<u16> {
        require!(
            self.game.status == GameStatus::Setup,
            RiskError::GameAlreadyStarted
        );
        require_keys_eq!(caller, self.game.current_player, RiskError::NotPlayerTurn);
        let player_count = self.roster.players.len();
        require!(player_count >= MIN_PLAYERS, RiskError::NotEnoughPlayers);
        require!(player_count <= MAX_PLAYERS, RiskError::MaxPlayersReached);
        require!(
            self.board.territories.len() >= player_count,
            RiskError::InvalidMap
        );

        let mut order: Vec<usize> = (0..self.board.territories.len()).collect();
        rng.shuffle(&mut order);
        for (deal, territory_index) in order.into_iter().enumerate() {
            let territory = &mut self.board.territories[territory_index];
            territory.owner = Some(self.roster.players[deal % player_count].key);
            territory.troops = INITIAL_TROOPS_PER_TERRITORY;
        }

        let first = self.roster.players[0].key;
        let reinforcements = self.owed_reinforcements(&first);
        for player in self.roster.players.iter_mut() {
            player.conquered_territory_this_turn = false;
        }
        self.game.status = GameStatus::InProgress;
        self.game.phase = TurnPhase::Reinforcement;
        self.game.turn = 1;
        self.game.current_player = first;
        self.game.pending_reinforcements = Some(reinforcements);
        self.game.fortified_this_turn = false;
        self.game.last_combat = None;
        Ok(reinforcements)
    }

    /// Returns the number of troops placed.
    pub fn place_reinforcements(&mut self, caller: Pubkey, placements: &[Placement]) -> Result<u16> {
        self.ensure_turn(&caller, TurnPhase::Reinforcement)?;
        let pending = self.game.pending_reinforcements.unwrap_or(0);
        require!(pending > 0, RiskError::NoReinforcements);
        require!(!placements.is_empty(), RiskError::InvalidTroopCount);

        let mut total: u32 = 0;
        let mut added = vec![0u32; self.board.territories.len()];
        for placement in placements {
            require!(placement.troops > 0, RiskError::InvalidTroopCount);
            let territory = self.board.territory(placement.territory_id)?;
            require!(territory.is_owned_by(&caller), RiskError::NotTerritoryOwner);
            total += u32::from(placement.troops);
            added[placement.territory_id as usize] += u32::from(placement.troops);
        }
        require!(total <= u32::from(pending), RiskError::InvalidTroopCount);
        for (territory, &extra) in self.board.territories.iter().zip(&added) {
            require!(
                u32::from(territory.troops) + extra <= u32::from(u16::MAX),
                RiskError::TroopOverflow
            );
        }

        for placement in placements {
            self.board.territory_mut(placement.territory_id)?.troops += placement.troops;
        }
        let placed = total as u16;
        self.game.pending_reinforcements = Some(pending - placed);
        Ok(placed)
    }

    pub fn attack(
        &mut self,
        caller: Pubkey,
        from: u8,
        to: u8,
        attacking_dice: u8,
        rng: &mut impl Entropy,
    ) -> Result<AttackOutcome> {
        self.ensure_turn(&caller, TurnPhase::Attack)?;
        let source = self.board.territory(from)?;
        let target = self.board.territory(to)?;
        require!(source.is_owned_by(&caller), RiskError::NotTerritoryOwner);
        require!(
            !target.is_owned_by(&caller),
            RiskError::CannotAttackOwnTerritory
        );
        require!(source.is_adjacent(to), RiskError::TerritoriesNotAdjacent);
        require!(
            (1..=MAX_ATTACK_DICE).contains(&attacking_dice),
            RiskError::InvalidDiceCount
        );
        require!(
            source.troops > u16::from(attacking_dice),
            RiskError::InsufficientTroops
        );
        let defender = target
            .owner
            .ok_or_else(|| error!(RiskError::InvalidTerritory))?;
        let defending_troops = target.troops;

        let mut combat = combat::resolve(rng, attacking_dice, defending_troops);
        let conquered = u16::from(combat.defender_losses) >= defending_troops;
        let attacker = self.roster.player(&caller)?;
        let first_conquest = conquered && !attacker.conquered_territory_this_turn;
        if first_conquest {
            require!(
                attacker.cards.len() < MAX_HAND_SIZE,
                RiskError::CardLimitReached
            );
        }
        let card = first_conquest.then(|| cards::draw_card(rng, self.board.territories.len()));

        let surviving = u16::from(attacking_dice - combat.attacker_losses);
        let moved = if conquered { surviving } else { 0 };
        {
            let source = self.board.territory_mut(from)?;
            source.troops -= u16::from(combat.attacker_losses) + moved;
        }
        {
            let target = self.board.territory_mut(to)?;
            if conquered {
                target.owner = Some(caller);
                target.troops = moved;
            } else {
                target.troops -= u16::from(combat.defender_losses);
            }
        }

        let mut eliminated = None;
        let mut winner = None;
        if conquered {
            let attacker = self.roster.player_mut(&caller)?;
            attacker.conquered_territory_this_turn = true;
            if let Some(card) = card {
                attacker.cards.push(card);
            }
            if self.board.owned_count(&defender) == 0 {
                eliminated = Some(defender);
            }
            if self.board.owns_all(&caller) {
                self.game.status = GameStatus::Completed;
                self.game.winner = Some(caller);
                self.game.pending_reinforcements = None;
                winner = Some(caller);
            }
        }

        combat.conquered = conquered;
        self.game.last_combat = Some(combat.clone());
        Ok(AttackOutcome {
            combat,
            defender,
            moved,
            card,
            eliminated,
            winner,
        })
    }

    pub fn fortify(&mut self, caller: Pubkey, from: u8, to: u8, troops: u16) -> Result<()> {
        self.ensure_turn(&caller, TurnPhase::Fortification)?;
        require!(!self.game.fortified_this_turn, RiskError::NoRemainingMoves);
        require!(from != to, RiskError::InvalidTerritory);
        let source = self.board.territory(from)?;
        let target = self.board.territory(to)?;
        require!(source.is_owned_by(&caller), RiskError::NotTerritoryOwner);
        require!(target.is_owned_by(&caller), RiskError::NotTerritoryOwner);
        require!(troops > 0, RiskError::InvalidTroopCount);
        require!(source.troops > troops, RiskError::InsufficientTroops);
        require!(
            target.troops.checked_add(troops).is_some(),
            RiskError::TroopOverflow
        );
        require!(
            are_territories_connected(self.board, from, to, &caller),
            RiskError::TerritoriesNotConnected
        );

        self.board.territory_mut(from)?.troops -= troops;
        self.board.territory_mut(to)?.troops += troops;
        self.game.fortified_this_turn = true;
        Ok(())
    }

    pub fn trade_cards(&mut self, caller: Pubkey, indices: &[u8]) -> Result<TradeOutcome> {
        self.ensure_turn(&caller, TurnPhase::Reinforcement)?;
        let player = self.roster.player(&caller)?;
        let traded = cards::select_set(&player.cards, indices)?;

        let bonus = cards::trade_bonus(self.game.card_sets_traded);
        let pending = self
            .game
            .pending_reinforcements
            .unwrap_or(0)
            .checked_add(bonus)
            .ok_or(RiskError::TroopOverflow)?;
        let territory_bonus = traded.iter().find_map(|card| {
            card.territory_id.filter(|&id| {
                self.board
                    .territory(id)
                    .map_or(false, |t| t.is_owned_by(&caller))
            })
        });
        if let Some(id) = territory_bonus {
            require!(
                self.board
                    .territory(id)?
                    .troops
                    .checked_add(TRADE_TERRITORY_BONUS)
                    .is_some(),
                RiskError::TroopOverflow
            );
        }

        cards::remove_from_hand(&mut self.roster.player_mut(&caller)?.cards, indices);
        if let Some(id) = territory_bonus {
            self.board.territory_mut(id)?.troops += TRADE_TERRITORY_BONUS;
        }
        let pending = pending.min(self.board.headroom(&caller));
        self.game.pending_reinforcements = Some(pending);
        self.game.card_sets_traded = self.game.card_sets_traded.saturating_add(1);
        Ok(TradeOutcome {
            bonus,
            territory_bonus,
            sets_traded: self.game.card_sets_traded,
        })
    }

    pub fn end_phase(&mut self, caller: Pubkey) -> Result<PhaseChange> {
        require!(self.game.is_in_progress(), RiskError::GameNotInProgress);
        require_keys_eq!(caller, self.game.current_player, RiskError::NotPlayerTurn);

        let mut reinforcements = None;
        match self.game.phase {
            TurnPhase::Reinforcement => {
                require!(
                    self.game.pending_reinforcements.unwrap_or(0) == 0,
                    RiskError::ReinforcementsRemaining
                );
                require!(
                    self.roster.player(&caller)?.cards.len() < TRADE_REQUIRED_HAND_SIZE,
                    RiskError::TradeRequired
                );
                self.game.pending_reinforcements = None;
            }
            TurnPhase::Attack => {}
            TurnPhase::Fortification => {
                let next = self.next_eligible_player()?;
                let owed = self.owed_reinforcements(&next);
                self.roster.player_mut(&next)?.conquered_territory_this_turn = false;
                self.game.turn = self.game.turn.saturating_add(1);
                self.game.current_player = next;
                self.game.fortified_this_turn = false;
                self.game.pending_reinforcements = Some(owed);
                reinforcements = Some(owed);
            }
        }
        self.game.phase = self.game.phase.next();
        self.game.last_combat = None;
        Ok(PhaseChange {
            phase: self.game.phase,
            turn: self.game.turn,
            current_player: self.game.current_player,
            reinforcements,
        })
    }

    /// Mixes an externally produced word into the seed. Only the configured
    /// provider may do so, and only before territories are dealt.
    pub fn fulfill_rng(&mut self, provider: Pubkey, word: [u8; 32]) -> Result<()> {
        require_keys_eq!(provider, self.game.config.rng_provider, RiskError::Unauthorized);
        require!(
            self.roster.position(&provider).is_none(),
            RiskError::Unauthorized
        );
        require!(
            self.game.status == GameStatus::Setup,
            RiskError::GameAlreadyStarted
        );
        self.game.rng_seed = derive_seed(&[self.game.rng_seed.as_ref(), word.as_ref()]);
        Ok(())
    }

    /// Reinforcements owed to `player`, capped so they always fit on the
    /// territories the player holds.
    fn owed_reinforcements(&self, player: &Pubkey) -> u16 {
        calculate_reinforcements(self.board, player).min(self.board.headroom(player))
    }

    /// The next seat after the current player that still holds territory.
    fn next_eligible_player(&self) -> Result<Pubkey> {
        let seats = self.roster.players.len();
        let current = self
            .roster
            .position(&self.game.current_player)
            .ok_or_else(|| error!(RiskError::PlayerNotFound))?;
        (1..=seats)
            .map(|step| &self.roster.players[(current + step) % seats])
            .find(|player| self.board.owned_count(&player.key) > 0)
            .map(|player| player.key)
            .ok_or_else(|| error!(RiskError::PlayerNotFound))
    }

    fn ensure_turn(&self, caller: &Pubkey, phase: TurnPhase) -> Result<()> {
        require!(self.game.is_in_progress(), RiskError::GameNotInProgress);
        require_keys_eq!(*caller, self.game.current_player, RiskError::NotPlayerTurn);
        require!(self.game.phase == phase, RiskError::InvalidPhase);
        Ok(())
    }
}
