//! Accumulated transcript with running counters.

use spotter_core::types::{Annotation, Counters};

use crate::annotator::{annotate, AnnotatedFragment};
use crate::keywords::KeywordSet;

/// The rendered transcript: every annotated token appended so far.
///
/// Each fragment is annotated exactly once, when it is appended. Counters
/// only grow until `clear` is called.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    annotations: Vec<Annotation>,
    fragments: usize,
    counters: Counters,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate a final fragment, append it, and update the counters.
    ///
    /// Returns the annotated fragment so callers can forward it to the
    /// presentation layer.
    pub fn append(&mut self, text: &str, keywords: &KeywordSet) -> AnnotatedFragment {
        let fragment = annotate(text, keywords);
        if fragment.word_delta == 0 {
            return fragment;
        }

        self.annotations.extend(fragment.annotations.iter().cloned());
        self.fragments += 1;
        self.counters
            .record(fragment.match_delta, fragment.word_delta);

        tracing::debug!(
            words = fragment.word_delta,
            matches = fragment.match_delta,
            total_words = self.counters.total_words,
            "Fragment appended to transcript"
        );
        fragment
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Number of non-empty fragments appended since the last clear.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Plain text of the transcript, tokens separated by single spaces.
    pub fn text(&self) -> String {
        self.annotations
            .iter()
            .map(Annotation::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Drop all text and reset both counters to zero.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.fragments = 0;
        self.counters.reset();
    }
}
