//! Practice word catalog — parsing and uniform random selection.
//!
//! Pure functions, no I/O. File loading lives in `spellbee-lib::catalog`.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::CatalogError;

// A word starts with a letter; letters, marks, apostrophes, hyphens and inner
// spaces may follow ("don't", "forty-two", "ice cream").
static RE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L}\p{M}'’\- ]*$").unwrap());

/// An ordered, non-empty list of practice words.
#[derive(Debug, Clone)]
pub struct WordCatalog {
    words: Vec<String>,
    skipped: Vec<String>,
}

impl WordCatalog {
    /// Parse a newline-delimited word list.
    ///
    /// Lines are trimmed. Blank lines and `#` comments are ignored; lines that
    /// are not a well-formed word are kept aside in [`WordCatalog::skipped`].
    /// Fails with [`CatalogError::Empty`] when nothing usable remains.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut words = Vec::new();
        let mut skipped = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if RE_WORD.is_match(line) {
                words.push(line.to_string());
            } else {
                skipped.push(line.to_string());
            }
        }

        if words.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { words, skipped })
    }

    /// Build a catalog from an in-memory list, applying the same rules as
    /// [`WordCatalog::parse`].
    pub fn from_words<I, S>(words: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse(&joined)
    }

    /// Pick a word uniformly at random using the thread-local generator.
    pub fn pick_random(&self) -> &str {
        self.pick_with(&mut rand::thread_rng())
    }

    /// Pick a word uniformly at random from the given generator.
    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let index = rng.gen_range(0..self.words.len());
        &self.words[index]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Lines rejected as malformed during parsing.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
