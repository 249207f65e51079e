//! Session store — opaque token → owned [`SessionState`].
//!
//! The map lock is held only for synchronous state transitions, never across
//! an await. Expiry is lazy: a stale session is reset on its next access, and
//! `sweep` drops expired sessions whenever a new one is created.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use spellbee_core::session::SessionState;

/// Opaque per-player session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<SessionToken, SessionState>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a fresh anonymous session and return its token.
    pub fn create(&self, now: Instant) -> SessionToken {
        self.sweep(now);
        let token = SessionToken::generate();
        self.lock().insert(token, SessionState::new(now, self.ttl));
        debug!("sessions: created {token}");
        token
    }

    /// Run `f` against the session for `token`.
    ///
    /// An unknown token gets a fresh session installed under it, and an
    /// expired one is reset first, so callers always see a live session.
    pub fn with_session<R>(
        &self,
        token: SessionToken,
        now: Instant,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> R {
        let mut sessions = self.lock();
        let session = sessions
            .entry(token)
            .or_insert_with(|| SessionState::new(now, self.ttl));
        if session.expire_if_stale(now) {
            debug!("sessions: {token} expired, reset");
        }
        f(session)
    }

    /// Read the session for `token` without registering anything.
    ///
    /// Unknown and expired tokens are shown a fresh session that is not
    /// stored, so read-only lookups never grow the map.
    pub fn view<R>(
        &self,
        token: SessionToken,
        now: Instant,
        f: impl FnOnce(&SessionState) -> R,
    ) -> R {
        let sessions = self.lock();
        match sessions.get(&token) {
            Some(session) if !session.is_expired(now) => f(session),
            _ => f(&SessionState::new(now, self.ttl)),
        }
    }

    /// Drop a session entirely.
    pub fn remove(&self, token: SessionToken) -> Option<SessionState> {
        self.lock().remove(&token)
    }

    /// Remove every expired session. Returns how many were dropped.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!("sessions: swept {dropped} expired");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionToken, SessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
