//! Durable leaderboard store.
//!
//! One process-wide board behind an async mutex. `record` holds the lock for
//! the whole insert → rank → persist sequence, so concurrent finishes never
//! lose an update or interleave writes.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use spellbee_core::leaderboard::{Leaderboard, LeaderboardEntry};

use crate::atomic::write_atomic;

pub struct LeaderboardStore {
    path: PathBuf,
    board: Mutex<Leaderboard>,
}

impl LeaderboardStore {
    /// Load the board stored at `path`. Missing or malformed storage yields an
    /// empty board; the next `record` overwrites it.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let board = load(&path).await;
        Self {
            path,
            board: Mutex::new(board),
        }
    }

    /// Add a finished session, re-rank, and persist the full board.
    ///
    /// If persisting fails the entry stays in memory and the error is
    /// returned; a later successful write includes it.
    pub async fn record(&self, entry: LeaderboardEntry) -> std::io::Result<()> {
        let mut board = self.board.lock().await;
        info!(
            "leaderboard: recording {} (score {}, {}%)",
            entry.name, entry.final_score, entry.correct_percentage
        );
        board.insert(entry);
        persist(&self.path, &board).await
    }

    /// Rewrite durable storage from the in-memory board.
    pub async fn persist(&self) -> std::io::Result<()> {
        let board = self.board.lock().await;
        persist(&self.path, &board).await
    }

    /// Read-only copy of the current ranking.
    pub async fn snapshot(&self) -> Leaderboard {
        self.board.lock().await.clone()
    }

    pub async fn top(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.board.lock().await.top(n).to_vec()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a board from disk, recovering to empty on any problem.
pub async fn load(path: &Path) -> Leaderboard {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("leaderboard: {} not found, starting empty", path.display());
            return Leaderboard::new();
        }
        Err(e) => {
            warn!("leaderboard: failed to read {}: {e}; starting empty", path.display());
            return Leaderboard::new();
        }
    };

    match serde_json::from_str::<Vec<LeaderboardEntry>>(&text) {
        Ok(entries) => {
            debug!("leaderboard: loaded {} entries", entries.len());
            Leaderboard::from_entries(entries)
        }
        Err(e) => {
            warn!("leaderboard: malformed {}: {e}; starting empty", path.display());
            Leaderboard::new()
        }
    }
}

/// Atomically replace `path` with the serialized board.
pub async fn persist(path: &Path, board: &Leaderboard) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(board)?;
    write_atomic(path, json).await?;
    debug!("leaderboard: persisted {} entries to {}", board.len(), path.display());
    Ok(())
}
