//! Session controller.
//!
//! Owns the keyword set, the transcript, the definition cache, the tooltip
//! and the recording state machine, and keeps the user-visible status and
//! error lines in step with them. Every operation takes `&mut self`, so
//! fragments are applied strictly one after another.
//!
//! Definition requests are split in two so the caller can run the service
//! call without holding the controller: `load_context` returns a ticket,
//! and `complete_definitions` applies the result if the ticket is current.

use serde::Serialize;
use spotter_annotate::{KeywordSet, Transcript};
use spotter_core::config::SpotterConfig;
use spotter_core::types::{Annotation, Counters};
use spotter_definitions::{
    CacheUpdate, DefinitionCache, DefinitionEntry, DefinitionError, DefinitionLookup,
    DefinitionTicket, Definitions,
};

use crate::engine::{CaptureEngine, CaptureEvent};
use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::state::{CaptureOutcome, RecordingStateMachine, RestartPolicy, SessionState};
use crate::tooltip::{BoundingBox, TooltipController, TooltipState};

const STATUS_READY: &str = "Ready";
const STATUS_CONTEXT_LOADED: &str = "Context loaded";
const STATUS_RECORDING: &str = "Recording...";
const STATUS_STOPPED: &str = "Stopped";
const STATUS_CLEARED: &str = "Transcript cleared";

/// Serializable view of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub status: String,
    pub error: Option<String>,
    pub keywords: Vec<String>,
    pub transcript: Vec<Annotation>,
    pub provisional: Option<String>,
    pub counters: Counters,
    pub definitions: Vec<DefinitionEntry>,
    pub definitions_loading: bool,
    pub definitions_error: Option<String>,
    pub tooltip: Option<TooltipState>,
    pub capture_active: bool,
}

#[derive(Debug)]
pub struct SessionController {
    keywords: KeywordSet,
    transcript: Transcript,
    provisional: Option<String>,
    definitions: DefinitionCache,
    definitions_error: Option<String>,
    tooltip: TooltipController,
    recorder: RecordingStateMachine,
    status: String,
    error: Option<String>,
    outbox: Vec<SessionEvent>,
}

impl SessionController {
    pub fn new(engine: Box<dyn CaptureEngine>, config: &SpotterConfig) -> Self {
        Self {
            keywords: KeywordSet::default(),
            transcript: Transcript::new(),
            provisional: None,
            definitions: DefinitionCache::new(),
            definitions_error: None,
            tooltip: TooltipController::new(config.tooltip.clone()),
            recorder: RecordingStateMachine::new(engine, RestartPolicy::from(&config.session)),
            status: STATUS_READY.to_string(),
            error: None,
            outbox: Vec::new(),
        }
    }

    // =========================================================================
    // Context
    // =========================================================================

    /// Replace the keyword set with the keywords found in `context`.
    ///
    /// On success the definition cache is reset to the new keywords, all
    /// pending, and the returned ticket identifies the request the caller
    /// should now send. On `EmptyInput` the keyword set and cache are emptied
    /// so no partial set survives.
    pub fn load_context(&mut self, context: &str) -> Result<DefinitionTicket, SessionError> {
        let keywords = match KeywordSet::parse(context) {
            Ok(keywords) => keywords,
            Err(err) => {
                self.keywords = KeywordSet::default();
                self.definitions.clear();
                self.definitions_error = None;
                let err = SessionError::from(err);
                self.report(&err);
                return Err(err);
            }
        };

        self.keywords = keywords;
        let ticket = self.definitions.begin(&self.keywords);
        self.definitions_error = None;
        self.error = None;
        self.status = STATUS_CONTEXT_LOADED.to_string();

        tracing::info!(
            keyword_count = self.keywords.len(),
            version = ticket.version,
            "Context loaded"
        );
        self.outbox.push(SessionEvent::ContextLoaded {
            keywords: self.keywords.to_vec(),
            version: ticket.version,
        });
        Ok(ticket)
    }

    /// Apply the result of the definition request behind `ticket`.
    ///
    /// Failures degrade to "definition unavailable" and never touch the
    /// recording state or the user-visible error line.
    pub fn complete_definitions(
        &mut self,
        ticket: &DefinitionTicket,
        result: Result<Definitions, DefinitionError>,
    ) -> Result<CacheUpdate, DefinitionError> {
        let version = ticket.version;
        match self.definitions.complete(ticket, result) {
            Ok(CacheUpdate::Stale) => Ok(CacheUpdate::Stale),
            Ok(CacheUpdate::Applied { defined, missing }) => {
                self.definitions_error = None;
                self.outbox.push(SessionEvent::DefinitionsUpdated {
                    version,
                    defined,
                    missing,
                    error: None,
                });
                Ok(CacheUpdate::Applied { defined, missing })
            }
            Err(err) => {
                self.definitions_error = Some(err.to_string());
                self.outbox.push(SessionEvent::DefinitionsUpdated {
                    version,
                    defined: 0,
                    missing: self.definitions.len(),
                    error: Some(err.to_string()),
                });
                Err(err)
            }
        }
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Acquire the capture engine and begin recording.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.keywords.is_empty() {
            let err = SessionError::NoKeywordsLoaded;
            self.report(&err);
            return Err(err);
        }

        if let Err(err) = self.recorder.start() {
            self.report(&err);
            return Err(err);
        }

        self.error = None;
        self.set_status(STATUS_RECORDING);
        Ok(())
    }

    /// Release the capture engine. Any pending definition request carries on.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        if let Err(err) = self.recorder.stop() {
            self.report(&err);
            return Err(err);
        }
        self.drop_provisional();
        self.set_status(STATUS_STOPPED);
        Ok(())
    }

    /// Empty the transcript and reset the counters. Valid in any state.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.drop_provisional();
        self.status = STATUS_CLEARED.to_string();
        tracing::info!("Transcript cleared");
        self.outbox.push(SessionEvent::TranscriptCleared);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Feed one capture engine event through the state machine.
    pub fn handle_capture_event(&mut self, event: CaptureEvent) -> CaptureOutcome {
        let outcome = self.recorder.handle_event(event);
        match &outcome {
            CaptureOutcome::Deliver(fragment) if fragment.is_final() => {
                let annotated = self.transcript.append(&fragment.text, &self.keywords);
                self.drop_provisional();
                if annotated.word_delta > 0 {
                    self.outbox.push(SessionEvent::FragmentAnnotated {
                        annotations: annotated.annotations,
                        match_delta: annotated.match_delta,
                        word_delta: annotated.word_delta,
                        counters: self.transcript.counters(),
                    });
                }
            }
            CaptureOutcome::Deliver(fragment) => {
                let text = fragment.text.trim();
                let provisional = (!text.is_empty()).then(|| text.to_string());
                if provisional != self.provisional {
                    self.provisional = provisional;
                    self.outbox.push(SessionEvent::InterimUpdated {
                        text: self.provisional.clone(),
                    });
                }
            }
            CaptureOutcome::Restarted => {
                self.outbox.push(SessionEvent::CaptureRestarted);
            }
            CaptureOutcome::Ended => {
                self.drop_provisional();
                self.set_status(STATUS_STOPPED);
            }
            CaptureOutcome::Failed(message) => {
                self.drop_provisional();
                self.push_state();
                self.report(&SessionError::CaptureEngine(message.clone()));
            }
            CaptureOutcome::Ignored => {}
        }
        outcome
    }

    // =========================================================================
    // Tooltip
    // =========================================================================

    /// Show the tooltip for a hovered span.
    pub fn hover(&mut self, text: &str, rect: BoundingBox) -> TooltipState {
        self.tooltip
            .hover_enter(text, rect, &self.definitions)
            .clone()
    }

    pub fn unhover(&mut self) {
        self.tooltip.hover_exit();
    }

    pub fn lookup(&self, token: &str) -> DefinitionLookup {
        self.definitions.lookup(token)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &SessionState {
        self.recorder.current()
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn counters(&self) -> Counters {
        self.transcript.counters()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn provisional(&self) -> Option<&str> {
        self.provisional.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.recorder.current().clone(),
            status: self.status.clone(),
            error: self.error.clone(),
            keywords: self.keywords.to_vec(),
            transcript: self.transcript.annotations().to_vec(),
            provisional: self.provisional.clone(),
            counters: self.transcript.counters(),
            definitions: self.definitions.entries(),
            definitions_loading: self.definitions.is_loading(),
            definitions_error: self.definitions_error.clone(),
            tooltip: self.tooltip.current().cloned(),
            capture_active: self.recorder.engine_active(),
        }
    }

    /// Take the events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn report(&mut self, err: &SessionError) {
        let message = err.user_message();
        tracing::warn!(error = %err, "Session error");
        self.error = Some(message.clone());
        self.outbox.push(SessionEvent::Error { message });
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.push_state();
    }

    fn push_state(&mut self) {
        self.outbox.push(SessionEvent::StateChanged {
            state: self.recorder.current().clone(),
            status: self.status.clone(),
        });
    }

    fn drop_provisional(&mut self) {
        if self.provisional.take().is_some() {
            self.outbox.push(SessionEvent::InterimUpdated { text: None });
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
