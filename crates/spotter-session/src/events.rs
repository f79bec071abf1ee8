//! Events emitted by the session for the presentation layer.

use serde::Serialize;
use spotter_core::types::{Annotation, Counters};

use crate::state::SessionState;

/// A change in session state, published after each controller operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new keyword set replaced the previous one.
    ContextLoaded { keywords: Vec<String>, version: u64 },
    /// A final fragment was annotated and appended.
    FragmentAnnotated {
        annotations: Vec<Annotation>,
        match_delta: u64,
        word_delta: u64,
        counters: Counters,
    },
    /// The provisional line changed; `None` hides it.
    InterimUpdated { text: Option<String> },
    StateChanged { state: SessionState, status: String },
    /// The capture engine ended on its own and was re-acquired.
    CaptureRestarted,
    /// A definition request for the current keyword set finished.
    DefinitionsUpdated {
        version: u64,
        defined: usize,
        missing: usize,
        error: Option<String>,
    },
    TranscriptCleared,
    /// A message for the user-visible error line.
    Error { message: String },
}
