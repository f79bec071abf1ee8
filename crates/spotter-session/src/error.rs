//! Error types for the recording session.

use spotter_annotate::KeywordError;
use spotter_core::error::SpotterError;

/// Errors from session lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Keywords(#[from] KeywordError),
    #[error("no keywords loaded")]
    NoKeywordsLoaded,
    #[error("speech capture is not supported in this environment")]
    CaptureUnsupported,
    #[error("capture engine error: {0}")]
    CaptureEngine(String),
    #[error("capture engine refused to start: {0}")]
    StartFailed(String),
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl SessionError {
    /// Message for the user-visible error line.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Keywords(KeywordError::EmptyInput) => {
                "Please enter context text".to_string()
            }
            SessionError::NoKeywordsLoaded => "Please load context first".to_string(),
            SessionError::CaptureUnsupported => {
                "Speech recognition is not supported in this environment".to_string()
            }
            SessionError::CaptureEngine(msg) => format!("Speech recognition error: {}", msg),
            SessionError::StartFailed(msg) => format!("Failed to start recording: {}", msg),
            SessionError::InvalidTransition { from, to } => {
                format!("Cannot go from {} to {}", from, to)
            }
        }
    }
}

impl From<SessionError> for SpotterError {
    fn from(err: SessionError) -> Self {
        SpotterError::Session(err.to_string())
    }
}
