//! Shared types for the spellbee quiz.
//!
//! These types are used across spellbee-lib, spellbee-cli, and any
//! presentation layer. Keeping them in spellbee-core means consumers can
//! depend on types without pulling in tokio, reqwest, or rodio.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

// ─── Synthesis types ───────────────────────────────────────────────────────

/// Speaking rate requested from the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rate {
    #[default]
    Normal,
    Slow,
}

impl Rate {
    /// Playback speed multiplier sent to the synthesis service.
    pub fn speed(self) -> f32 {
        match self {
            Rate::Normal => 1.0,
            Rate::Slow => 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rate::Normal => "normal",
            Rate::Slow => "slow",
        }
    }
}

impl std::str::FromStr for Rate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Rate::Normal),
            "slow" => Ok(Rate::Slow),
            other => Err(format!("unknown rate '{other}' (expected normal or slow)")),
        }
    }
}

/// Voice parameters. Fixed process-wide and folded into every cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceParams {
    pub voice: String,
    pub language: String,
    pub rate: Rate,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice: "af_heart".into(),
            language: "en-us".into(),
            rate: Rate::Normal,
        }
    }
}

/// Synthesis service configuration.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub url: String,
    pub voice: VoiceParams,
    pub timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3001".into(),
            voice: VoiceParams::default(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Synthesized audio for one word, as published by the audio cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub word: String,
    /// File name under the cache directory, also used as the public audio id.
    pub file_name: String,
    pub path: PathBuf,
    pub created_at: SystemTime,
}

// ─── Game configuration ────────────────────────────────────────────────────

/// Default idle lifetime of a player session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Game engine configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub words_path: PathBuf,
    pub cache_dir: PathBuf,
    pub leaderboard_path: PathBuf,
    pub session_ttl: Duration,
    pub synthesis: SynthesisConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            words_path: "words.txt".into(),
            cache_dir: "word_files".into(),
            leaderboard_path: "leaderboard.json".into(),
            session_ttl: DEFAULT_SESSION_TTL,
            synthesis: SynthesisConfig::default(),
        }
    }
}
