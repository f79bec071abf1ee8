//! Recording state machine.
//!
//! Valid transitions:
//! - Ready -> Recording (start)
//! - Stopped -> Recording (start)
//! - Error -> Recording (start)
//! - Recording -> Stopped (stop)
//! - Recording -> Error (engine error)
//!
//! End-of-stream while Recording is not a user-visible transition: the
//! engine is re-acquired and the state stays Recording.

use std::fmt;

use serde::Serialize;
use spotter_core::config::SessionConfig;
use spotter_core::types::TranscriptFragment;

use crate::engine::{CaptureEngine, CaptureEvent};
use crate::error::SessionError;

/// Lifecycle state of the recording session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SessionState {
    /// Constructed, never started.
    Ready,
    /// Capture engine acquired; fragments are routed to the annotator.
    Recording,
    /// Stopped by the user.
    Stopped,
    /// Stopped by an engine failure.
    Error(String),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Ready => write!(f, "Ready"),
            SessionState::Recording => write!(f, "Recording"),
            SessionState::Stopped => write!(f, "Stopped"),
            SessionState::Error(_) => write!(f, "Error"),
        }
    }
}

impl SessionState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Ready, SessionState::Recording)
                | (SessionState::Stopped, SessionState::Recording)
                | (SessionState::Error(_), SessionState::Recording)
                | (SessionState::Recording, SessionState::Stopped)
                | (SessionState::Recording, SessionState::Error(_))
        )
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }
}

/// What to do when the engine ends on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub auto_restart: bool,
    /// Consecutive restarts allowed without a fragment in between (0 = unlimited).
    pub max_consecutive: u32,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            auto_restart: true,
            max_consecutive: 0,
        }
    }
}

impl From<&SessionConfig> for RestartPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            auto_restart: config.auto_restart,
            max_consecutive: config.max_auto_restarts,
        }
    }
}

/// Result of feeding one capture event to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A fragment to hand to the annotator.
    Deliver(TranscriptFragment),
    /// The engine ended and was re-acquired; still Recording.
    Restarted,
    /// The engine ended and restarting is disabled; now Stopped.
    Ended,
    /// The engine failed; now Error and the engine is released.
    Failed(String),
    /// The event arrived while not Recording and was dropped.
    Ignored,
}

/// Owns the capture engine and the session lifecycle.
pub struct RecordingStateMachine {
    state: SessionState,
    engine: Box<dyn CaptureEngine>,
    policy: RestartPolicy,
    consecutive_restarts: u32,
}

impl fmt::Debug for RecordingStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingStateMachine")
            .field("state", &self.state)
            .field("engine_active", &self.engine.is_active())
            .field("policy", &self.policy)
            .field("consecutive_restarts", &self.consecutive_restarts)
            .finish()
    }
}

impl RecordingStateMachine {
    pub fn new(engine: Box<dyn CaptureEngine>, policy: RestartPolicy) -> Self {
        Self {
            state: SessionState::Ready,
            engine,
            policy,
            consecutive_restarts: 0,
        }
    }

    pub fn current(&self) -> &SessionState {
        &self.state
    }

    pub fn engine_active(&self) -> bool {
        self.engine.is_active()
    }

    fn transition(&mut self, target: SessionState) -> Result<(), SessionError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Session state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Acquire the engine and enter Recording.
    ///
    /// On failure the state is unchanged and the engine is not held. An
    /// engine refusal surfaces as `StartFailed`, not as a mid-session error.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if !self.state.can_transition_to(&SessionState::Recording) {
            return Err(SessionError::InvalidTransition {
                from: self.state.to_string(),
                to: SessionState::Recording.to_string(),
            });
        }
        self.engine.start().map_err(|err| match err {
            SessionError::CaptureEngine(msg) => SessionError::StartFailed(msg),
            other => other,
        })?;
        self.consecutive_restarts = 0;
        self.transition(SessionState::Recording)?;
        tracing::info!("Recording started");
        Ok(())
    }

    /// Release the engine and enter Stopped.
    ///
    /// Because the state leaves Recording first, a late end-of-stream event
    /// can no longer trigger a restart.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Stopped)?;
        self.engine.stop();
        tracing::info!("Recording stopped");
        Ok(())
    }

    /// Feed one engine event through the lifecycle rules.
    pub fn handle_event(&mut self, event: CaptureEvent) -> CaptureOutcome {
        if !self.state.is_recording() {
            tracing::debug!(state = %self.state, "Capture event ignored outside Recording");
            return CaptureOutcome::Ignored;
        }

        match event {
            CaptureEvent::Fragment(fragment) => {
                self.consecutive_restarts = 0;
                CaptureOutcome::Deliver(fragment)
            }
            CaptureEvent::Error { message } => {
                tracing::warn!(error = %message, "Capture engine reported an error");
                self.fail(message)
            }
            CaptureEvent::End => self.on_end(),
        }
    }

    fn on_end(&mut self) -> CaptureOutcome {
        if !self.policy.auto_restart {
            self.engine.stop();
            self.state = SessionState::Stopped;
            tracing::info!("Capture engine ended; auto-restart disabled");
            return CaptureOutcome::Ended;
        }

        if self.policy.max_consecutive > 0 && self.consecutive_restarts >= self.policy.max_consecutive
        {
            return self.fail("capture engine ended repeatedly".to_string());
        }

        self.engine.stop();
        match self.engine.start() {
            Ok(()) => {
                self.consecutive_restarts += 1;
                tracing::info!(
                    consecutive_restarts = self.consecutive_restarts,
                    "Capture engine ended unexpectedly; restarted"
                );
                CaptureOutcome::Restarted
            }
            Err(err) => {
                let message = match err {
                    SessionError::CaptureEngine(msg) => msg,
                    other => other.to_string(),
                };
                self.fail(message)
            }
        }
    }

    fn fail(&mut self, message: String) -> CaptureOutcome {
        self.engine.stop();
        self.state = SessionState::Error(message.clone());
        CaptureOutcome::Failed(message)
    }
}

// =============================================================================
// Tests
// =============================================================================
