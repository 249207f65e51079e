//! Per-player quiz state machine.
//!
//! ```text
//! Anonymous ──set_identity──▶ Named ──start_round──▶ Playing
//!                                                   │  ▲ "?" (replay)
//!                                       submit_guess│  │
//!                                                   ▼
//!            Ready ◀──continue_playing──────── Checking ──start_round──▶ Playing
//! ```
//!
//! `finish` is accepted from every phase and returns the session to a fresh
//! `Anonymous` state. Every operation first applies lazy expiry: a session
//! past its deadline behaves exactly like a new one.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::SessionError;
use crate::leaderboard::{LeaderboardEntry, correct_percentage};
use crate::types::{AudioArtifact, DEFAULT_SESSION_TTL};

/// Input that asks for the current word to be played again.
pub const REPLAY_SENTINEL: &str = "?";

/// Observable session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Anonymous,
    Named,
    Ready,
    Playing,
    Checking,
}

/// Result of [`SessionState::submit_guess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The player asked to hear the word again. Nothing was recorded.
    Replay {
        word: String,
        artifact: Option<AudioArtifact>,
    },
    Correct {
        word: String,
    },
    /// `guess` is reported back for display only; the session records
    /// `expected` in its wrong-word list.
    Wrong {
        expected: String,
        guess: String,
    },
}

/// Read-only view of a session for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub name: Option<String>,
    pub phase: Phase,
    pub score: u32,
    pub correct_words: Vec<String>,
    pub wrong_words: Vec<String>,
    pub correct_percentage: f64,
}

/// One player's quiz session.
#[derive(Debug, Clone)]
pub struct SessionState {
    identity: Option<String>,
    score: u32,
    correct_words: Vec<String>,
    wrong_words: Vec<String>,
    current_word: Option<String>,
    current_artifact: Option<AudioArtifact>,
    phase: Phase,
    ttl: Duration,
    created_at: Instant,
    expires_at: Instant,
}

impl SessionState {
    /// A fresh anonymous session whose lifetime starts at `now`.
    pub fn new(now: Instant, ttl: Duration) -> Self {
        Self {
            identity: None,
            score: 0,
            correct_words: Vec::new(),
            wrong_words: Vec::new(),
            current_word: None,
            current_artifact: None,
            phase: Phase::Anonymous,
            ttl,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Reset to a fresh session if the deadline has passed.
    /// Returns `true` when a reset happened.
    pub fn expire_if_stale(&mut self, now: Instant) -> bool {
        if self.is_expired(now) {
            *self = Self::new(now, self.ttl);
            return true;
        }
        false
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Name the player. Blank names are rejected and leave the session as-is.
    pub fn set_identity(&mut self, name: &str, now: Instant) -> Result<(), SessionError> {
        self.expire_if_stale(now);

        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidIdentity);
        }

        self.identity = Some(name.to_string());
        if self.phase == Phase::Anonymous {
            self.phase = Phase::Named;
        }
        Ok(())
    }

    /// Put a word in play. A round still pending judgment is abandoned
    /// without being recorded.
    pub fn start_round(
        &mut self,
        word: impl Into<String>,
        artifact: Option<AudioArtifact>,
        now: Instant,
    ) {
        self.expire_if_stale(now);
        self.current_word = Some(word.into());
        self.current_artifact = artifact;
        self.phase = Phase::Playing;
    }

    /// Judge the player's input against the word in play.
    ///
    /// Comparison is exact and case-sensitive. [`REPLAY_SENTINEL`] returns the
    /// current round unchanged.
    pub fn submit_guess(&mut self, input: &str, now: Instant) -> Result<GuessOutcome, SessionError> {
        self.expire_if_stale(now);

        if self.phase != Phase::Playing {
            return Err(SessionError::NoActiveRound);
        }
        let Some(word) = self.current_word.clone() else {
            return Err(SessionError::NoActiveRound);
        };

        if input == REPLAY_SENTINEL {
            return Ok(GuessOutcome::Replay {
                word,
                artifact: self.current_artifact.clone(),
            });
        }

        self.phase = Phase::Checking;
        if input == word {
            self.score += 1;
            self.correct_words.push(word.clone());
            Ok(GuessOutcome::Correct { word })
        } else {
            self.wrong_words.push(word.clone());
            Ok(GuessOutcome::Wrong {
                expected: word,
                guess: input.to_string(),
            })
        }
    }

    /// Leave the verdict screen: `Checking → Ready`. No-op in other phases.
    pub fn continue_playing(&mut self, now: Instant) {
        self.expire_if_stale(now);
        if self.phase == Phase::Checking {
            self.current_word = None;
            self.current_artifact = None;
            self.phase = Phase::Ready;
        }
    }

    /// End the session. Emits a leaderboard entry when the player is named,
    /// then clears everything back to a fresh anonymous session.
    pub fn finish(&mut self, now: Instant) -> Option<LeaderboardEntry> {
        self.expire_if_stale(now);

        let entry = self.identity.as_ref().map(|name| {
            LeaderboardEntry::new(name.clone(), self.correct_words.len(), self.wrong_words.len())
        });
        *self = Self::new(now, self.ttl);
        entry
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            name: self.identity.clone(),
            phase: self.phase,
            score: self.score,
            correct_words: self.correct_words.clone(),
            wrong_words: self.wrong_words.clone(),
            correct_percentage: self.correct_percentage(),
        }
    }

    pub fn correct_percentage(&self) -> f64 {
        correct_percentage(self.correct_words.len(), self.wrong_words.len())
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_words(&self) -> &[String] {
        &self.correct_words
    }

    pub fn wrong_words(&self) -> &[String] {
        &self.wrong_words
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn current_artifact(&self) -> Option<&AudioArtifact> {
        self.current_artifact.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Instant::now(), DEFAULT_SESSION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    const TTL: Duration = Duration::from_secs(60);

    fn fresh() -> (SessionState, Instant) {
        let now = Instant::now();
        (SessionState::new(now, TTL), now)
    }

    fn artifact(word: &str) -> AudioArtifact {
        AudioArtifact {
            word: word.into(),
            file_name: format!("{word}.wav"),
            path: PathBuf::from(format!("/tmp/{word}.wav")),
            created_at: SystemTime::UNIX_EPOCH,
        }
    }

    fn named(name: &str) -> (SessionState, Instant) {
        let (mut s, now) = fresh();
        s.set_identity(name, now).unwrap();
        (s, now)
    }

    #[test]
    fn starts_anonymous_and_empty() {
        let (s, now) = fresh();
        assert_eq!(s.phase(), Phase::Anonymous);
        assert_eq!(s.identity(), None);
        assert_eq!(s.score(), 0);
        assert!(s.current_word().is_none());
        assert_eq!(s.expires_at(), now + TTL);
    }

    #[test]
    fn naming_moves_to_named() {
        let (s, _) = named("  Ada ");
        assert_eq!(s.phase(), Phase::Named);
        assert_eq!(s.identity(), Some("Ada"));
    }

    #[test]
    fn blank_name_is_rejected_without_mutation() {
        let (mut s, now) = fresh();
        assert_eq!(s.set_identity("   ", now), Err(SessionError::InvalidIdentity));
        assert_eq!(s.set_identity("", now), Err(SessionError::InvalidIdentity));
        assert_eq!(s.phase(), Phase::Anonymous);
        assert_eq!(s.identity(), None);
    }

    #[test]
    fn renaming_keeps_phase() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", None, now);
        s.set_identity("Grace", now).unwrap();
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.identity(), Some("Grace"));
    }

    #[test]
    fn guess_without_round_is_rejected() {
        let (mut s, now) = named("Ada");
        assert_eq!(s.submit_guess("cat", now), Err(SessionError::NoActiveRound));
        assert_eq!(s.phase(), Phase::Named);
        assert!(s.wrong_words().is_empty());
    }

    #[test]
    fn guess_after_verdict_is_rejected() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", None, now);
        s.submit_guess("cat", now).unwrap();
        assert_eq!(s.submit_guess("cat", now), Err(SessionError::NoActiveRound));
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn correct_guess_scores() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", Some(artifact("cat")), now);
        let outcome = s.submit_guess("cat", now).unwrap();
        assert_eq!(outcome, GuessOutcome::Correct { word: "cat".into() });
        assert_eq!(s.phase(), Phase::Checking);
        assert_eq!(s.score(), 1);
        assert_eq!(s.correct_words(), ["cat"]);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let (mut s, now) = named("Ada");
        s.start_round("Paris", None, now);
        let outcome = s.submit_guess("paris", now).unwrap();
        assert!(matches!(outcome, GuessOutcome::Wrong { .. }));
    }

    #[test]
    fn wrong_guess_records_expected_word() {
        let (mut s, now) = named("Ada");
        s.start_round("necessary", None, now);
        let outcome = s.submit_guess("neccesary", now).unwrap();
        assert_eq!(
            outcome,
            GuessOutcome::Wrong {
                expected: "necessary".into(),
                guess: "neccesary".into(),
            }
        );
        assert_eq!(s.wrong_words(), ["necessary"]);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn replay_never_mutates() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", Some(artifact("cat")), now);
        s.submit_guess("cat", now).unwrap();
        s.start_round("dog", Some(artifact("dog")), now);

        for _ in 0..3 {
            let outcome = s.submit_guess(REPLAY_SENTINEL, now).unwrap();
            assert_eq!(
                outcome,
                GuessOutcome::Replay {
                    word: "dog".into(),
                    artifact: Some(artifact("dog")),
                }
            );
        }
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.score(), 1);
        assert_eq!(s.correct_words(), ["cat"]);
        assert!(s.wrong_words().is_empty());
        assert_eq!(s.current_word(), Some("dog"));
        assert_eq!(s.current_artifact(), Some(&artifact("dog")));
    }

    #[test]
    fn n_correct_submissions_score_n() {
        for n in [0usize, 1, 5, 20] {
            let (mut s, now) = named("Ada");
            for i in 0..n {
                let word = format!("word{i}");
                s.start_round(word.clone(), None, now);
                s.submit_guess(&word, now).unwrap();
                s.continue_playing(now);
            }
            assert_eq!(s.score() as usize, n);
            assert_eq!(s.correct_words().len(), n);
        }
    }

    #[test]
    fn continue_playing_moves_checking_to_ready() {
        let (mut s, now) = named("Ada");
        s.continue_playing(now);
        assert_eq!(s.phase(), Phase::Named);

        s.start_round("cat", None, now);
        s.submit_guess("dog", now).unwrap();
        s.continue_playing(now);
        assert_eq!(s.phase(), Phase::Ready);
        assert!(s.current_word().is_none());
    }

    #[test]
    fn abandoned_round_is_not_recorded() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", None, now);
        s.start_round("dog", None, now);
        s.submit_guess("dog", now).unwrap();
        assert_eq!(s.correct_words(), ["dog"]);
        assert!(s.wrong_words().is_empty());
    }

    #[test]
    fn cat_then_dog_scenario() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", None, now);
        s.submit_guess("cat", now).unwrap();
        s.start_round("dog", None, now);
        s.submit_guess("dgo", now).unwrap();

        let entry = s.finish(now).unwrap();
        assert_eq!(entry.name, "Ada");
        assert_eq!(entry.final_score, 1);
        assert_eq!(entry.correct_percentage, 50.0);
    }

    #[test]
    fn finish_clears_session() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", None, now);
        s.submit_guess("cat", now).unwrap();
        let later = now + Duration::from_secs(5);
        s.finish(later);

        assert_eq!(s.phase(), Phase::Anonymous);
        assert_eq!(s.identity(), None);
        assert_eq!(s.score(), 0);
        assert!(s.correct_words().is_empty());
        assert_eq!(s.created_at(), later);
    }

    #[test]
    fn finish_without_identity_emits_nothing() {
        let (mut s, now) = fresh();
        s.start_round("cat", None, now);
        s.submit_guess("cat", now).unwrap();
        assert_eq!(s.finish(now), None);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn finish_with_no_rounds_scores_zero() {
        let (mut s, now) = named("Ada");
        let entry = s.finish(now).unwrap();
        assert_eq!(entry.final_score, 0);
        assert_eq!(entry.correct_percentage, 0.0);
    }

    #[test]
    fn expired_session_behaves_as_fresh() {
        let (mut s, now) = named("Ada");
        s.start_round("cat", None, now);
        s.submit_guess("cat", now).unwrap();
        s.start_round("dog", None, now);

        let late = now + TTL;
        assert!(s.is_expired(late));
        assert_eq!(s.submit_guess("dog", late), Err(SessionError::NoActiveRound));
        assert_eq!(s.phase(), Phase::Anonymous);
        assert_eq!(s.score(), 0);
        assert_eq!(s.expires_at(), late + TTL);
    }

    #[test]
    fn expired_finish_emits_nothing() {
        let (mut s, now) = named("Ada");
        assert_eq!(s.finish(now + TTL * 2), None);
    }

    #[test]
    fn summary_reports_percentage() {
        let (mut s, now) = named("Ada");
        for (word, guess) in [("a", "a"), ("b", "b"), ("c", "c"), ("d", "x")] {
            s.start_round(word, None, now);
            s.submit_guess(guess, now).unwrap();
        }
        let summary = s.summary();
        assert_eq!(summary.score, 3);
        assert_eq!(summary.correct_percentage, 75.0);
        assert_eq!(summary.wrong_words, ["d"]);
    }
}
