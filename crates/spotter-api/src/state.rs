//! Application state shared across all route handlers.
//!
//! The session controller sits behind a single mutex: every handler takes
//! the lock, runs one operation to completion, and publishes the resulting
//! events before releasing it. Nothing is awaited while the lock is held.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use spotter_core::config::SpotterConfig;
use spotter_definitions::{DefinitionTicket, DictionaryService};
use spotter_session::{RemoteCaptureEngine, SessionController, SessionEvent};

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<SpotterConfig>,
    /// The single recording session.
    pub session: Arc<Mutex<SessionController>>,
    /// Handle on the capture engine running in the client.
    pub capture: RemoteCaptureEngine,
    /// Backend used for definition requests.
    pub dictionary: Arc<dyn DictionaryService>,
    /// Broadcast sender for SSE events.
    pub event_tx: tokio::sync::broadcast::Sender<SessionEvent>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: SpotterConfig, dictionary: Arc<dyn DictionaryService>) -> Self {
        let capture = RemoteCaptureEngine::new();
        let session = SessionController::new(Box::new(capture.clone()), &config);
        let (event_tx, _) = tokio::sync::broadcast::channel(256);
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            capture,
            dictionary,
            event_tx,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn lock_session(&self) -> Result<MutexGuard<'_, SessionController>, ApiError> {
        self.session
            .lock()
            .map_err(|e| ApiError::Internal(format!("Session lock poisoned: {}", e)))
    }

    /// Drain the session's pending events and send them to SSE subscribers.
    ///
    /// Takes the locked controller so batches go out in the order the
    /// controller produced them. Having no subscribers is fine.
    pub fn publish(&self, session: &mut SessionController) {
        for event in session.drain_events() {
            let _ = self.event_tx.send(event);
        }
    }

    /// Run the definition request for `ticket` in the background.
    ///
    /// The session lock is only taken once the service has answered, so
    /// recording and matching carry on while the request is in flight.
    pub fn spawn_definitions(&self, ticket: DefinitionTicket) {
        let state = self.clone();
        tokio::spawn(async move {
            let result = state.dictionary.define(&ticket.keywords).await;
            match state.session.lock() {
                Ok(mut session) => {
                    // Failures are recorded on the session; nothing to propagate.
                    let _ = session.complete_definitions(&ticket, result);
                    state.publish(&mut session);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Session lock poisoned; dropping definitions");
                }
            }
        });
    }
}
