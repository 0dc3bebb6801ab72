use anchor_lang::prelude::*;

#[error_code]
pub enum RiskError {
    #[msg("It is not this player's turn")]
    NotPlayerTurn,
    #[msg("Game is not in progress")]
    GameNotInProgress,
    #[msg("Game has already started")]
    GameAlreadyStarted,
    #[msg("Maximum number of players reached")]
    MaxPlayersReached,
    #[msg("Color is already taken")]
    ColorAlreadyTaken,
    #[msg("Unknown player color")]
    InvalidColor,
    #[msg("Territory is not owned by the caller")]
    NotTerritoryOwner,
    #[msg("Not enough troops in the territory")]
    InsufficientTroops,
    #[msg("Cannot attack a territory you own")]
    CannotAttackOwnTerritory,
    #[msg("Territories are not adjacent")]
    TerritoriesNotAdjacent,
    #[msg("Territories are not connected through owned territory")]
    TerritoriesNotConnected,
    #[msg("Action not allowed in current phase")]
    InvalidPhase,
    #[msg("Invalid number of dice")]
    InvalidDiceCount,
    #[msg("Invalid troop count")]
    InvalidTroopCount,
    #[msg("Cards do not form a tradeable set")]
    InvalidCardSet,
    #[msg("Card index out of range or repeated")]
    InvalidCardIndex,
    #[msg("Hand is full")]
    CardLimitReached,
    #[msg("No reinforcements available")]
    NoReinforcements,
    #[msg("No moves remaining this phase")]
    NoRemainingMoves,
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Player has already joined this game")]
    AlreadyJoined,
    #[msg("Not enough players to start")]
    NotEnoughPlayers,
    #[msg("Player limit out of range")]
    InvalidPlayerLimit,
    #[msg("Territory id out of range")]
    InvalidTerritory,
    #[msg("Continent id out of range")]
    InvalidContinent,
    #[msg("Malformed territory or continent table")]
    InvalidMap,
    #[msg("Reinforcements must be placed before leaving the phase")]
    ReinforcementsRemaining,
    #[msg("A card set must be traded before leaving the phase")]
    TradeRequired,
    #[msg("Troop count overflow")]
    TroopOverflow,
    #[msg("Player not registered in this game")]
    PlayerNotFound,
    #[msg("Recent slot hash unavailable")]
    SlotHashUnavailable,
}
