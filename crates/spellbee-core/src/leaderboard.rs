//! Leaderboard entries and ranking.

use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of one finished session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    #[serde(rename = "score")]
    pub final_score: u32,
    pub correct_percentage: f64,
}

impl LeaderboardEntry {
    /// Snapshot a session outcome from its correct and wrong tallies.
    pub fn new(name: impl Into<String>, correct: usize, wrong: usize) -> Self {
        Self {
            name: name.into(),
            final_score: correct as u32,
            correct_percentage: round2(correct_percentage(correct, wrong)),
        }
    }
}

/// `100 * correct / (correct + wrong)`, or 0 when no rounds were judged.
pub fn correct_percentage(correct: usize, wrong: usize) -> f64 {
    let total = correct + wrong;
    if total == 0 {
        return 0.0;
    }
    100.0 * correct as f64 / total as f64
}

// Two decimals keep the stored value stable across save/load cycles.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Finished sessions ranked by score, highest first.
///
/// Ties keep insertion order: ranking always uses a stable sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from entries in storage order, re-ranking them.
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.rank();
        board
    }

    /// Append an entry and re-rank.
    pub fn insert(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.rank();
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// The first `n` entries.
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rank(&mut self) {
        // `sort_by` is stable
        self.entries.sort_by(|a, b| b.final_score.cmp(&a.final_score));
    }
}

// Deserialized boards go through `from_entries` so they are always ranked.
impl<'de> Deserialize<'de> for Leaderboard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<LeaderboardEntry>::deserialize(deserializer).map(Self::from_entries)
    }
}
