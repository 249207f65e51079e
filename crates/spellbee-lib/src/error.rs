//! Error types for the quiz engine.

use std::time::Duration;

use thiserror::Error;

pub use spellbee_core::error::{CatalogError, SessionError};

/// The synthesis collaborator could not produce audio for a word.
///
/// Recoverable: the caller decides whether to retry the round or give up.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("synthesis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("synthesis returned no audio")]
    EmptyAudio,

    #[error("failed to store audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure surfaced by [`crate::game::SpellingGame`].
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
