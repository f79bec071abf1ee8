//! Token classification for incoming transcript text.
//!
//! Tokens are whitespace-delimited. A token matches when, after dropping at
//! most one trailing sentence mark and lowercasing, it equals a keyword.
//! There is no stemming or fuzzy matching.

use serde::Serialize;
use spotter_core::types::Annotation;

use crate::keywords::KeywordSet;

/// Sentence marks removed from the end of a token before comparison.
const TRAILING_MARKS: &[char] = &['.', ',', '!', '?'];

/// The annotated form of one fragment plus its counter deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotatedFragment {
    pub annotations: Vec<Annotation>,
    pub match_delta: u64,
    pub word_delta: u64,
}

/// Normalize a token into its lookup key.
///
/// Strips exactly one trailing `.`, `,`, `!` or `?` and lowercases the rest.
/// The definition cache uses the same function so that a hovered span
/// resolves to the key it matched on.
pub fn normalize_token(token: &str) -> String {
    let stripped = token.strip_suffix(TRAILING_MARKS).unwrap_or(token);
    stripped.to_lowercase()
}

/// Annotate a fragment against a keyword set.
///
/// Pure: the same text and keyword set always produce the same output.
/// Text with no tokens yields an empty annotation list and zero deltas.
pub fn annotate(text: &str, keywords: &KeywordSet) -> AnnotatedFragment {
    let mut fragment = AnnotatedFragment::default();

    for token in text.split_whitespace() {
        let key = normalize_token(token);
        // An empty key can only come from a lone mark; keywords are never empty.
        let annotation = if !key.is_empty() && keywords.contains(&key) {
            fragment.match_delta += 1;
            Annotation::Match(token.to_string())
        } else {
            Annotation::Plain(token.to_string())
        };
        fragment.annotations.push(annotation);
        fragment.word_delta += 1;
    }

    fragment
}
