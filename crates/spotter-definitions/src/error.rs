//! Error types for definition lookup.

use spotter_core::error::SpotterError;

/// Errors from the definition service boundary.
///
/// All variants degrade to the same cache outcome (no definition text); the
/// distinction only matters for user messaging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The request was rejected: missing or empty keyword list.
    #[error("invalid definition request: {0}")]
    Validation(String),
    /// The service could not produce definitions.
    #[error("definition generation failed: {0}")]
    Generation(String),
    /// The service could not be reached.
    #[error("definition service unreachable: {0}")]
    Transport(String),
    /// The service answered with a body that does not fit the contract.
    #[error("malformed definition response: {0}")]
    MalformedResponse(String),
}

impl DefinitionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DefinitionError::Validation(_))
    }
}

impl From<reqwest::Error> for DefinitionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DefinitionError::MalformedResponse(err.to_string())
        } else {
            DefinitionError::Transport(err.to_string())
        }
    }
}

impl From<DefinitionError> for SpotterError {
    fn from(err: DefinitionError) -> Self {
        SpotterError::Definitions(err.to_string())
    }
}
