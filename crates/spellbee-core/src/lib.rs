//! spellbee-core — Pure types and game logic.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod error;
pub mod leaderboard;
pub mod session;
pub mod types;
pub mod words;
