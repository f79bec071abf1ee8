//! Keyword set extraction from free-form context text.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::KeywordError;

/// A normalized, deduplicated set of lookup keys.
///
/// Keys are trimmed and lowercased. Membership tests are O(1); iteration
/// follows first-insertion order so that definition requests built from the
/// same context are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet {
    ordered: Vec<String>,
    #[serde(skip)]
    lookup: HashSet<String>,
}

impl KeywordSet {
    /// Build a keyword set from context text.
    ///
    /// Splits on any run of commas and whitespace, drops empty pieces and
    /// lowercases the rest. Duplicates collapse silently. Fails with
    /// `EmptyInput` when nothing can be extracted; a partial set is never
    /// returned.
    pub fn parse(context: &str) -> Result<Self, KeywordError> {
        if context.trim().is_empty() {
            return Err(KeywordError::EmptyInput);
        }

        let set = Self::from_keys(
            context
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|piece| !piece.is_empty()),
        );

        if set.is_empty() {
            return Err(KeywordError::EmptyInput);
        }

        tracing::debug!(keyword_count = set.len(), "Keyword set built");
        Ok(set)
    }

    /// Collect already-split keys, normalizing each one.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = KeywordSet::default();
        for key in keys {
            set.insert(key.as_ref());
        }
        set
    }

    fn insert(&mut self, key: &str) {
        let normalized = key.trim().to_lowercase();
        if normalized.is_empty() {
            return;
        }
        if self.lookup.insert(normalized.clone()) {
            self.ordered.push(normalized);
        }
    }

    /// Exact membership test. `key` must already be normalized.
    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains(key)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Keys in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ordered.clone()
    }
}
