//! Error types for keyword extraction.

use spotter_core::error::SpotterError;

/// Errors raised while building a keyword set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeywordError {
    #[error("no keywords found in context text")]
    EmptyInput,
}

impl From<KeywordError> for SpotterError {
    fn from(err: KeywordError) -> Self {
        SpotterError::Keywords(err.to_string())
    }
}
