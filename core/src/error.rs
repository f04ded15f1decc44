use thiserror::Error;

use crate::CardId;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid card id {id}, the current deal has {len} cards")]
    InvalidCardId { id: CardId, len: usize },
    #[error("Unknown difficulty, expected one of: easy, medium, hard")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;
