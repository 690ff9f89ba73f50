use thiserror::Error;

use crate::deck::{SlotId, WordId};
use crate::game::Phase;

/// Rejected game moves. None of these are fatal: the session is left
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("action not allowed while {0}")]
    InvalidPhase(Phase),

    #[error("word {0} is not in the pool")]
    UnknownWord(WordId),

    #[error("no slot named {0}")]
    UnknownSlot(SlotId),

    #[error("slot {0} is already filled")]
    SlotOccupied(SlotId),

    #[error("slot {0} is empty")]
    SlotEmpty(SlotId),

    #[error("pool has no word at position {0}")]
    PoolIndex(usize),

    /// Words can only be dragged out of the pool.
    #[error("invalid move")]
    InvalidMove,

    #[error("{empty} slot(s) still empty")]
    IncompleteSubmission { empty: usize },
}

/// Problems loading or validating a deck.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("no embedded deck named '{0}'")]
    NotFound(String),

    #[error("deck file could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("deck is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("deck '{0}' has no slots")]
    NoSlots(String),

    #[error("deck '{deck}' has {words} word(s) for {slots} slot(s)")]
    TooFewWords {
        deck: String,
        words: usize,
        slots: usize,
    },

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("word '{word}' points at missing slot '{slot}'")]
    MissingSlot { word: String, slot: String },

    #[error("no word belongs in slot '{0}'")]
    UnreachableSlot(String),
}

/// Best-time persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
