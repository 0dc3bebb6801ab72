use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::slot_hashes;

pub mod cards;
pub mod combat;
pub mod connectivity;
pub mod constants;
pub mod engine;
pub mod error;
pub mod reinforcements;
pub mod rng;
pub mod state;

use engine::GameSession;
use rng::{derive_seed, instruction_rng, latest_slot_hash, SeededRng};
use state::*;

const GAME_SEED: &[u8] = b"game";
const BOARD_SEED: &[u8] = b"board";
const ROSTER_SEED: &[u8] = b"roster";

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[event]
pub struct GameInitialized {
    pub game: Pubkey,
    pub game_id: u64,
    pub creator: Pubkey,
    pub color: PlayerColor,
    pub max_players: u8,
    pub territories: u8,
    pub continents: u8,
}

#[event]
pub struct PlayerJoined {
    pub game: Pubkey,
    pub player: Pubkey,
    pub color: PlayerColor,
    pub player_count: u8,
}

#[event]
pub struct TerritoriesDistributed {
    pub game: Pubkey,
    pub territories: u8,
    pub player_count: u8,
}

#[event]
pub struct TurnStarted {
    pub game: Pubkey,
    pub player: Pubkey,
    pub turn: u32,
    pub reinforcements: u16,
}

#[event]
pub struct ReinforcementsPlaced {
    pub game: Pubkey,
    pub player: Pubkey,
    pub troops: u16,
    pub remaining: u16,
}

#[event]
pub struct AttackResolved {
    pub game: Pubkey,
    pub attacker: Pubkey,
    pub defender: Pubkey,
    pub from: u8,
    pub to: u8,
    pub attacker_rolls: Vec<u8>,
    pub defender_rolls: Vec<u8>,
    pub attacker_losses: u8,
    pub defender_losses: u8,
    pub conquered: bool,
}

#[event]
pub struct TerritoryConquered {
    pub game: Pubkey,
    pub territory: u8,
    pub new_owner: Pubkey,
    pub previous_owner: Pubkey,
    pub troops_moved: u16,
    pub card_awarded: bool,
}

#[event]
pub struct PlayerEliminated {
    pub game: Pubkey,
    pub player: Pubkey,
    pub eliminated_by: Pubkey,
}

#[event]
pub struct GameCompleted {
    pub game: Pubkey,
    pub winner: Pubkey,
    pub turn: u32,
}

#[event]
pub struct CardsTraded {
    pub game: Pubkey,
    pub player: Pubkey,
    pub bonus: u16,
    pub territory_bonus: Option<u8>,
    pub sets_traded: u16,
}

#[event]
pub struct Fortified {
    pub game: Pubkey,
    pub player: Pubkey,
    pub from: u8,
    pub to: u8,
    pub troops: u16,
}

#[event]
pub struct PhaseAdvanced {
    pub game: Pubkey,
    pub player: Pubkey,
    pub phase: TurnPhase,
    pub turn: u32,
}

#[event]
pub struct RngFulfilled {
    pub game: Pubkey,
    pub provider: Pubkey,
    pub word: [u8; 32],
}

#[program]
pub mod risk_game {
    use super::*;

    pub fn initialize_game(ctx: Context<InitializeGame>, args: InitializeGameArgs) -> Result<()> {
        let creator = ctx.accounts.creator.key();
        let game_key = ctx.accounts.game.key();
        let slot = Clock::get()?.slot;

        let color = ctx.accounts.session().initialize(
            creator,
            &args.color,
            args.max_players,
            args.rng_provider,
            args.territories,
            args.continents,
        )?;

        let game = &mut ctx.accounts.game;
        game.game_id = args.game_id;
        game.rng_seed = derive_seed(&[
            game_key.as_ref(),
            creator.as_ref(),
            slot.to_le_bytes().as_ref(),
        ]);
        game.rng_nonce = 0;
        game.bump = ctx.bumps.game;

        let board = &mut ctx.accounts.board;
        board.game = game_key;
        board.bump = ctx.bumps.board;
        let territories = board.territories.len() as u8;
        let continents = board.continents.len() as u8;

        let roster = &mut ctx.accounts.roster;
        roster.game = game_key;
        roster.bump = ctx.bumps.roster;

        msg!(
            "game {} created by {} ({} territories, {} continents)",
            args.game_id,
            creator,
            territories,
            continents
        );
        emit!(GameInitialized {
            game: game_key,
            game_id: args.game_id,
            creator,
            color,
            max_players: args.max_players,
            territories,
            continents,
        });
        Ok(())
    }

    pub fn join_game(ctx: Context<PlayTurn>, color: String) -> Result<()> {
        let player = ctx.accounts.player.key();
        let color = ctx.accounts.session().join(player, &color)?;
        let player_count = ctx.accounts.roster.players.len() as u8;
        msg!("{} joined as {:?}, {} seated", player, color, player_count);
        emit!(PlayerJoined {
            game: ctx.accounts.game.key(),
            player,
            color,
            player_count,
        });
        Ok(())
    }

    pub fn distribute_initial_territories(ctx: Context<PlayTurn>) -> Result<()> {
        let caller = ctx.accounts.player.key();
        let mut rng = ctx.accounts.rng()?;
        let reinforcements = ctx
            .accounts
            .session()
            .distribute_initial_territories(caller, &mut rng)?;
        ctx.accounts.game.rng_nonce = rng.nonce();

        let game = ctx.accounts.game.key();
        msg!("territories dealt, {} opens with {} troops", caller, reinforcements);
        emit!(TerritoriesDistributed {
            game,
            territories: ctx.accounts.board.territories.len() as u8,
            player_count: ctx.accounts.roster.players.len() as u8,
        });
        emit!(TurnStarted {
            game,
            player: ctx.accounts.game.current_player,
            turn: ctx.accounts.game.turn,
            reinforcements,
        });
        Ok(())
    }

    pub fn place_reinforcements(ctx: Context<PlayTurn>, placements: Vec<Placement>) -> Result<()> {
        let player = ctx.accounts.player.key();
        let troops = ctx
            .accounts
            .session()
            .place_reinforcements(player, &placements)?;
        let remaining = ctx.accounts.game.pending_reinforcements.unwrap_or(0);
        msg!("placed {} troops, {} remaining", troops, remaining);
        emit!(ReinforcementsPlaced {
            game: ctx.accounts.game.key(),
            player,
            troops,
            remaining,
        });
        Ok(())
    }

    pub fn attack(ctx: Context<PlayTurn>, from: u8, to: u8, attacking_dice: u8) -> Result<()> {
        let attacker = ctx.accounts.player.key();
        let mut rng = ctx.accounts.rng()?;
        let outcome = ctx
            .accounts
            .session()
            .attack(attacker, from, to, attacking_dice, &mut rng)?;
        ctx.accounts.game.rng_nonce = rng.nonce();

        let game = ctx.accounts.game.key();
        let combat = outcome.combat;
        msg!(
            "attack {} -> {}: {:?} vs {:?}",
            from,
            to,
            combat.attacker_rolls,
            combat.defender_rolls
        );
        emit!(AttackResolved {
            game,
            attacker,
            defender: outcome.defender,
            from,
            to,
            attacker_rolls: combat.attacker_rolls,
            defender_rolls: combat.defender_rolls,
            attacker_losses: combat.attacker_losses,
            defender_losses: combat.defender_losses,
            conquered: combat.conquered,
        });
        if combat.conquered {
            emit!(TerritoryConquered {
                game,
                territory: to,
                new_owner: attacker,
                previous_owner: outcome.defender,
                troops_moved: outcome.moved,
                card_awarded: outcome.card.is_some(),
            });
        }
        if let Some(player) = outcome.eliminated {
            msg!("{} eliminated", player);
            emit!(PlayerEliminated {
                game,
                player,
                eliminated_by: attacker,
            });
        }
        if let Some(winner) = outcome.winner {
            msg!("{} controls the whole map", winner);
            emit!(GameCompleted {
                game,
                winner,
                turn: ctx.accounts.game.turn,
            });
        }
        Ok(())
    }

    pub fn fortify(ctx: Context<PlayTurn>, from: u8, to: u8, troops: u16) -> Result<()> {
        let player = ctx.accounts.player.key();
        ctx.accounts.session().fortify(player, from, to, troops)?;
        msg!("fortified {} -> {} with {}", from, to, troops);
        emit!(Fortified {
            game: ctx.accounts.game.key(),
            player,
            from,
            to,
            troops,
        });
        Ok(())
    }

    pub fn trade_cards(ctx: Context<PlayTurn>, card_indices: Vec<u8>) -> Result<()> {
        let player = ctx.accounts.player.key();
        let outcome = ctx.accounts.session().trade_cards(player, &card_indices)?;
        msg!("set {} traded for {}", outcome.sets_traded, outcome.bonus);
        emit!(CardsTraded {
            game: ctx.accounts.game.key(),
            player,
            bonus: outcome.bonus,
            territory_bonus: outcome.territory_bonus,
            sets_traded: outcome.sets_traded,
        });
        Ok(())
    }

    pub fn end_phase(ctx: Context<PlayTurn>) -> Result<()> {
        let player = ctx.accounts.player.key();
        let change = ctx.accounts.session().end_phase(player)?;
        let game = ctx.accounts.game.key();
        msg!("turn {}: {:?}", change.turn, change.phase);
        emit!(PhaseAdvanced {
            game,
            player,
            phase: change.phase,
            turn: change.turn,
        });
        if let Some(reinforcements) = change.reinforcements {
            emit!(TurnStarted {
                game,
                player: change.current_player,
                turn: change.turn,
                reinforcements,
            });
        }
        Ok(())
    }

    pub fn get_continent_bonus(ctx: Context<ReadBoard>, continent_id: u8) -> Result<u8> {
        ctx.accounts.board.continent_bonus(continent_id)
    }

    pub fn are_territories_connected(
        ctx: Context<ReadBoard>,
        start: u8,
        end: u8,
        owner: Pubkey,
    ) -> Result<bool> {
        connectivity::check_connected(&ctx.accounts.board, start, end, &owner)
    }

    /// Mixes an externally produced random word into the game seed.
    pub fn fulfill_rng(ctx: Context<FulfillRng>, rng_word: [u8; 32]) -> Result<()> {
        let provider = ctx.accounts.provider.key();
        GameSession::new(
            &mut ctx.accounts.game,
            &mut ctx.accounts.board,
            &mut ctx.accounts.roster,
        )
        .fulfill_rng(provider, rng_word)?;
        msg!("seed refreshed by {}", provider);
        emit!(RngFulfilled {
            game: ctx.accounts.game.key(),
            provider,
            word: rng_word,
        });
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeGameArgs {
    pub game_id: u64,
    pub color: String,
    pub max_players: u8,
    pub rng_provider: Pubkey,
    pub territories: Vec<Territory>,
    pub continents: Vec<Continent>,
}

#[derive(Accounts)]
#[instruction(args: InitializeGameArgs)]
pub struct InitializeGame<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,
    #[account(
        init,
        payer = creator,
        space = 8 + Game::INIT_SPACE,
        seeds = [GAME_SEED, creator.key().as_ref(), &args.game_id.to_le_bytes()],
        bump
    )]
    pub game: Account<'info, Game>,
    #[account(
        init,
        payer = creator,
        space = 8 + Board::INIT_SPACE,
        seeds = [BOARD_SEED, game.key().as_ref()],
        bump
    )]
    pub board: Account<'info, Board>,
    #[account(
        init,
        payer = creator,
        space = 8 + Roster::INIT_SPACE,
        seeds = [ROSTER_SEED, game.key().as_ref()],
        bump
    )]
    pub roster: Account<'info, Roster>,
    pub system_program: Program<'info, System>,
}

impl<'info> InitializeGame<'info> {
    fn session(&mut self) -> GameSession<'_> {
        GameSession::new(&mut self.game, &mut self.board, &mut self.roster)
    }
}

#[derive(Accounts)]
pub struct PlayTurn<'info> {
    pub player: Signer<'info>,
    #[account(
        mut,
        seeds = [GAME_SEED, game.creator.as_ref(), &game.game_id.to_le_bytes()],
        bump = game.bump
    )]
    pub game: Account<'info, Game>,
    #[account(
        mut,
        seeds = [BOARD_SEED, game.key().as_ref()],
        bump = board.bump,
        has_one = game
    )]
    pub board: Account<'info, Board>,
    #[account(
        mut,
        seeds = [ROSTER_SEED, game.key().as_ref()],
        bump = roster.bump,
        has_one = game
    )]
    pub roster: Account<'info, Roster>,
    /// CHECK: address constrained to the SlotHashes sysvar
    #[account(address = slot_hashes::ID)]
    pub slot_hashes: UncheckedAccount<'info>,
}

impl<'info> PlayTurn<'info> {
    fn session(&mut self) -> GameSession<'_> {
        GameSession::new(&mut self.game, &mut self.board, &mut self.roster)
    }

    fn rng(&self) -> Result<SeededRng> {
        let data = self.slot_hashes.try_borrow_data()?;
        let slot_hash = latest_slot_hash(&data)?;
        Ok(instruction_rng(
            self.game.rng_seed,
            self.game.rng_nonce,
            slot_hash,
        ))
    }
}

#[derive(Accounts)]
pub struct ReadBoard<'info> {
    #[account(
        seeds = [GAME_SEED, game.creator.as_ref(), &game.game_id.to_le_bytes()],
        bump = game.bump
    )]
    pub game: Account<'info, Game>,
    #[account(seeds = [BOARD_SEED, game.key().as_ref()], bump = board.bump, has_one = game)]
    pub board: Account<'info, Board>,
}

#[derive(Accounts)]
pub struct FulfillRng<'info> {
    pub provider: Signer<'info>,
    #[account(
        mut,
        seeds = [GAME_SEED, game.creator.as_ref(), &game.game_id.to_le_bytes()],
        bump = game.bump
    )]
    pub game: Account<'info, Game>,
    #[account(seeds = [BOARD_SEED, game.key().as_ref()], bump = board.bump, has_one = game)]
    pub board: Account<'info, Board>,
    #[account(seeds = [ROSTER_SEED, game.key().as_ref()], bump = roster.bump, has_one = game)]
    pub roster: Account<'info, Roster>,
}
