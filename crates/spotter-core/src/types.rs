use serde::{Deserialize, Serialize};

// =============================================================================
// Transcript fragments
// =============================================================================

/// Whether a fragment is provisional or settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Provisional text that the capture engine may still revise.
    Interim,
    /// Settled text. Only final fragments reach the transcript and counters.
    Final,
}

/// A unit of transcribed text emitted by the capture engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    pub text: String,
    pub kind: FragmentKind,
}

impl TranscriptFragment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FragmentKind::Interim,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FragmentKind::Final,
        }
    }

    pub fn is_final(&self) -> bool {
        self.kind == FragmentKind::Final
    }
}

// =============================================================================
// Annotations
// =============================================================================

/// A labeled span of rendered transcript text.
///
/// The text is always the original token, trailing punctuation included.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Annotation {
    /// A token whose normalized form equals a keyword.
    Match(String),
    /// Any other token.
    Plain(String),
}

impl Annotation {
    pub fn text(&self) -> &str {
        match self {
            Annotation::Match(text) | Annotation::Plain(text) => text,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Annotation::Match(_))
    }
}

// =============================================================================
// Counters
// =============================================================================

/// Running word and match totals for the transcript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Tokens appended to the transcript so far.
    pub total_words: u64,
    /// Tokens classified as matches.
    pub matched_words: u64,
}

impl Counters {
    /// Add the deltas of one annotated fragment.
    pub fn record(&mut self, match_delta: u64, word_delta: u64) {
        debug_assert!(match_delta <= word_delta);
        self.total_words += word_delta;
        self.matched_words += match_delta;
    }

    pub fn reset(&mut self) {
        *self = Counters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_constructors() {
        let interim = TranscriptFragment::interim("the ca");
        assert_eq!(interim.kind, FragmentKind::Interim);
        assert!(!interim.is_final());

        let settled = TranscriptFragment::final_text("the cat");
        assert_eq!(settled.kind, FragmentKind::Final);
        assert!(settled.is_final());
        assert_eq!(settled.text, "the cat");
    }

    #[test]
    fn test_fragment_kind_serialization() {
        let json = serde_json::to_string(&FragmentKind::Interim).unwrap();
        assert_eq!(json, "\"interim\"");
        let kind: FragmentKind = serde_json::from_str("\"final\"").unwrap();
        assert_eq!(kind, FragmentKind::Final);
    }

    #[test]
    fn test_annotation_accessors() {
        let hit = Annotation::Match("Cat.".to_string());
        let miss = Annotation::Plain("ran".to_string());
        assert!(hit.is_match());
        assert!(!miss.is_match());
        assert_eq!(hit.text(), "Cat.");
        assert_eq!(miss.text(), "ran");
    }

    #[test]
    fn test_annotation_wire_shape() {
        let value = serde_json::to_value(Annotation::Match("cat".to_string())).unwrap();
        assert_eq!(value, serde_json::json!({"kind": "match", "text": "cat"}));

        let parsed: Annotation =
            serde_json::from_value(serde_json::json!({"kind": "plain", "text": "The"})).unwrap();
        assert_eq!(parsed, Annotation::Plain("The".to_string()));
    }

    #[test]
    fn test_counters_record_and_reset() {
        let mut counters = Counters::default();
        counters.record(1, 3);
        counters.record(0, 2);
        assert_eq!(counters.total_words, 5);
        assert_eq!(counters.matched_words, 1);

        counters.reset();
        assert_eq!(counters, Counters::default());
    }
}
