//! spellbee-lib — Spelling quiz engine.
//!
//! Word loading, audio cache in front of a synthesis service, session store,
//! durable leaderboard, game facade, and HTTP API.
//! Depends on spellbee-core for pure types and game logic.

pub mod atomic;
pub mod audio;
pub mod catalog;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod server;
pub mod sessions;

// Re-export spellbee-core for convenience
pub use spellbee_core;
