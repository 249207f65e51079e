//! Error types for the pure game logic.

use thiserror::Error;

/// Word list could not produce a playable catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("word list contains no usable words")]
    Empty,

    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected session transition. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("player name must not be empty")]
    InvalidIdentity,

    #[error("no word is currently in play")]
    NoActiveRound,
}
