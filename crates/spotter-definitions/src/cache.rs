//! Versioned definition cache.
//!
//! The cache only ever reflects the latest loaded keyword set. Each call to
//! `begin` bumps the version and returns a ticket; a result is applied only
//! when its ticket still carries the current version, so a slow response for
//! an older context can never overwrite entries of a newer one.

use std::collections::HashMap;

use serde::Serialize;
use spotter_annotate::{normalize_token, KeywordSet};

use crate::error::DefinitionError;
use crate::service::DictionaryService;
use crate::wire::Definitions;

/// Cached definition state for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionEntry {
    pub key: String,
    pub text: Option<String>,
    pub pending: bool,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionLookup {
    pub text: Option<String>,
    pub pending: bool,
}

/// Identifies one in-flight definition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionTicket {
    pub version: u64,
    /// Keywords to send, in keyword-set order.
    pub keywords: Vec<String>,
}

/// What `complete` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUpdate {
    /// Definitions were stored.
    Applied { defined: usize, missing: usize },
    /// The ticket belongs to a superseded request; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct DefinitionCache {
    version: u64,
    entries: HashMap<String, DefinitionEntry>,
}

impl DefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for a new keyword set.
    ///
    /// Drops every entry outside `keywords` and marks each key pending.
    pub fn begin(&mut self, keywords: &KeywordSet) -> DefinitionTicket {
        self.version += 1;
        self.entries = keywords
            .iter()
            .map(|key| {
                (
                    key.to_string(),
                    DefinitionEntry {
                        key: key.to_string(),
                        text: None,
                        pending: true,
                    },
                )
            })
            .collect();

        tracing::debug!(
            version = self.version,
            keyword_count = self.entries.len(),
            "Definition request started"
        );

        DefinitionTicket {
            version: self.version,
            keywords: keywords.to_vec(),
        }
    }

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// On success, returned words are matched case-insensitively against the
    /// pending keys; words that were never requested are dropped. On failure
    /// every entry leaves the pending state without text and the error is
    /// handed back. Stale tickets change nothing, whatever the outcome.
    pub fn complete(
        &mut self,
        ticket: &DefinitionTicket,
        result: Result<Definitions, DefinitionError>,
    ) -> Result<CacheUpdate, DefinitionError> {
        if ticket.version != self.version {
            tracing::warn!(
                ticket_version = ticket.version,
                current_version = self.version,
                "Discarding definitions for a superseded keyword set"
            );
            return Ok(CacheUpdate::Stale);
        }

        let outcome = match result {
            Ok(definitions) => {
                for (word, text) in definitions {
                    let key = word.trim().to_lowercase();
                    let text = text.trim();
                    match self.entries.get_mut(&key) {
                        Some(entry) if !text.is_empty() => entry.text = Some(text.to_string()),
                        Some(_) => {}
                        None => {
                            tracing::warn!(word = %word, "Dropping definition for a word that was not requested");
                        }
                    }
                }
                let defined = self.entries.values().filter(|e| e.text.is_some()).count();
                Ok(CacheUpdate::Applied {
                    defined,
                    missing: self.entries.len() - defined,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, version = self.version, "Definition request failed");
                Err(err)
            }
        };

        for entry in self.entries.values_mut() {
            entry.pending = false;
        }
        outcome
    }

    /// Begin a request, await `service`, and apply the result.
    ///
    /// Holds `&mut self` across the await, so it suits callers that own the
    /// cache exclusively; shared callers use `begin` and `complete` around
    /// their own task.
    pub async fn request_definitions(
        &mut self,
        keywords: &KeywordSet,
        service: &dyn DictionaryService,
    ) -> Result<CacheUpdate, DefinitionError> {
        let ticket = self.begin(keywords);
        let result = service.define(&ticket.keywords).await;
        self.complete(&ticket, result)
    }

    /// Forget every entry and invalidate in-flight tickets.
    pub fn clear(&mut self) {
        self.version += 1;
        self.entries.clear();
    }

    /// Look up a hovered token.
    ///
    /// The token is normalized exactly as the annotator does it. Unknown keys
    /// report no text and no pending request.
    pub fn lookup(&self, token: &str) -> DefinitionLookup {
        let key = normalize_token(token.trim());
        match self.entries.get(&key) {
            Some(entry) => DefinitionLookup {
                text: entry.text.clone(),
                pending: entry.pending,
            },
            None => DefinitionLookup {
                text: None,
                pending: false,
            },
        }
    }

    /// Whether any entry is still waiting for the service.
    pub fn is_loading(&self) -> bool {
        self.entries.values().any(|e| e.pending)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<DefinitionEntry> {
        let mut entries: Vec<DefinitionEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}
