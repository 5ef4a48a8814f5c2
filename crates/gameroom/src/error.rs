use rbs_cards::Card;
use rbs_core::*;
use thiserror::Error;

/// Rejected board mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("slot {0} is off the board")]
    OutOfRange(Slot),
    #[error("slot {0} already holds {1}")]
    Occupied(Slot, Card),
}

/// Parameters that cannot produce a playable game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("{0} slots cannot hold a claim of {} cards", SET_SIZE)]
    TooFewSlots(usize),
    #[error("a deck of {0} cards cannot hold a set")]
    DeckTooSmall(usize),
    #[error("a deck of {size} cards exceeds the {max} distinct cards")]
    DeckTooLarge { size: usize, max: usize },
    #[error("{0} must be a positive duration")]
    ZeroDuration(&'static str),
}

/// Failures surfaced by the game entry points.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("games must be started from within a tokio runtime")]
    NoRuntime,
    #[error("no player P{0} at this table")]
    NoSuchPlayer(PlayerId),
    #[error("dealer task failed: {0}")]
    Dealer(#[from] tokio::task::JoinError),
}
