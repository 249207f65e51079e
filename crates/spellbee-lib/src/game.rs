//! Game facade — the surface presentation layers call into.
//!
//! A round: pick a word from the catalog, resolve its audio through the
//! cache, install it in the player's session. Finishing a named session
//! records its entry in the leaderboard store and discards the session.

use std::time::Instant;

use tracing::info;

use spellbee_core::leaderboard::{Leaderboard, LeaderboardEntry};
use spellbee_core::session::{GuessOutcome, SessionSummary};
use spellbee_core::types::{AudioArtifact, GameConfig};
use spellbee_core::words::WordCatalog;

use crate::audio::{AudioCache, Synthesizer};
use crate::catalog;
use crate::error::{GameError, SessionError, SynthesisError};
use crate::leaderboard::LeaderboardStore;
use crate::sessions::{SessionStore, SessionToken};

/// A word paired with its synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub word: String,
    pub artifact: AudioArtifact,
}

pub struct SpellingGame<S> {
    catalog: WordCatalog,
    audio: AudioCache<S>,
    leaderboard: LeaderboardStore,
    sessions: SessionStore,
}

impl<S: Synthesizer> SpellingGame<S> {
    /// Load the word list and leaderboard, and prepare the audio cache.
    ///
    /// A missing or empty word list is fatal. A missing or malformed
    /// leaderboard is not.
    pub async fn open(config: &GameConfig, synth: S) -> Result<Self, GameError> {
        let catalog = catalog::load(&config.words_path).await?;
        let audio = AudioCache::open(
            synth,
            config.synthesis.voice.clone(),
            &config.cache_dir,
            config.synthesis.timeout,
        )
        .await?;
        let leaderboard = LeaderboardStore::open(&config.leaderboard_path).await;
        let sessions = SessionStore::new(config.session_ttl);

        Ok(Self::from_parts(catalog, audio, leaderboard, sessions))
    }

    pub fn from_parts(
        catalog: WordCatalog,
        audio: AudioCache<S>,
        leaderboard: LeaderboardStore,
        sessions: SessionStore,
    ) -> Self {
        Self {
            catalog,
            audio,
            leaderboard,
            sessions,
        }
    }

    pub fn new_session(&self) -> SessionToken {
        self.sessions.create(Instant::now())
    }

    pub fn set_name(&self, token: SessionToken, name: &str) -> Result<SessionSummary, SessionError> {
        let now = Instant::now();
        self.sessions.with_session(token, now, |s| -> Result<_, SessionError> {
            s.set_identity(name, now)?;
            Ok(s.summary())
        })
    }

    /// Pick a random word and resolve its audio. Touches no session.
    pub async fn get_next_word_and_audio(&self) -> Result<Round, SynthesisError> {
        let word = self.catalog.pick_random().to_string();
        let artifact = self.audio.resolve(&word).await?;
        Ok(Round { word, artifact })
    }

    /// Start a new round for `token` and return the audio to play.
    ///
    /// On synthesis failure the session is left exactly as it was.
    pub async fn play(&self, token: SessionToken) -> Result<AudioArtifact, GameError> {
        let Round { word, artifact } = self.get_next_word_and_audio().await?;
        let now = Instant::now();
        self.sessions
            .with_session(token, now, |s| s.start_round(word, Some(artifact.clone()), now));
        Ok(artifact)
    }

    pub fn submit_guess(&self, token: SessionToken, text: &str) -> Result<GuessOutcome, SessionError> {
        let now = Instant::now();
        self.sessions.with_session(token, now, |s| s.submit_guess(text, now))
    }

    /// Leave the verdict of the last round.
    pub fn next_round(&self, token: SessionToken) -> SessionSummary {
        let now = Instant::now();
        self.sessions.with_session(token, now, |s| {
            s.continue_playing(now);
            s.summary()
        })
    }

    /// End the session, record its entry if the player was named, and
    /// discard it. Returns the recorded entry.
    pub async fn finish_session(
        &self,
        token: SessionToken,
    ) -> Result<Option<LeaderboardEntry>, GameError> {
        let now = Instant::now();
        let entry = self.sessions.with_session(token, now, |s| s.finish(now));
        self.sessions.remove(token);

        if let Some(entry) = &entry {
            info!("game: {token} finished as {} with {}", entry.name, entry.final_score);
            self.leaderboard.record(entry.clone()).await?;
        }
        Ok(entry)
    }

    pub fn session_summary(&self, token: SessionToken) -> SessionSummary {
        self.sessions.view(token, Instant::now(), |s| s.summary())
    }

    /// Read-only ranking of all finished sessions.
    pub async fn current_leaderboard(&self) -> Leaderboard {
        self.leaderboard.snapshot().await
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn audio(&self) -> &AudioCache<S> {
        &self.audio
    }

    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
