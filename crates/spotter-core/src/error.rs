use thiserror::Error;

/// Top-level error type for the Spotter system.
///
/// Each variant carries the message of a component-specific error. Component
/// crates define their own error types and implement
/// `From<ComponentError> for SpotterError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpotterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keyword error: {0}")]
    Keywords(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Definition error: {0}")]
    Definitions(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SpotterError {
    fn from(err: toml::de::Error) -> Self {
        SpotterError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SpotterError {
    fn from(err: toml::ser::Error) -> Self {
        SpotterError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SpotterError {
    fn from(err: serde_json::Error) -> Self {
        SpotterError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Spotter operations.
pub type Result<T> = std::result::Result<T, SpotterError>;
