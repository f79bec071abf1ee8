//! Route handler functions for all API endpoints.
//!
//! Session handlers lock the controller, run one operation, and publish its
//! events while still holding the lock.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use spotter_core::types::Counters;
use spotter_definitions::{DefinitionRequest, DefinitionResponse, ServiceErrorBody};
use spotter_session::{
    BoundingBox, CaptureEvent, CaptureOutcome, SessionSnapshot, SessionState, TooltipState,
};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub context: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// Whether the client has a usable capture engine. Omitted means unchanged.
    #[serde(default)]
    pub capture_supported: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HoverRequest {
    pub text: String,
    pub rect: BoundingBox,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub started_at: DateTime<Utc>,
    pub dictionary: String,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub keywords: Vec<String>,
    pub version: u64,
}

/// Settings the client needs to drive its capture engine.
#[derive(Debug, Serialize)]
pub struct CaptureSettings {
    pub language: String,
    pub interim_results: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionActionResponse {
    pub success: bool,
    pub state: SessionState,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureSettings>,
}

/// What the client should do with its capture engine after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureDirective {
    /// Keep the engine running.
    Continue,
    /// Start the engine again; it ended on its own.
    Restart,
    /// Leave the engine stopped.
    Released,
    /// The event arrived outside a recording and had no effect.
    Ignored,
}

impl From<&CaptureOutcome> for CaptureDirective {
    fn from(outcome: &CaptureOutcome) -> Self {
        match outcome {
            CaptureOutcome::Deliver(_) => CaptureDirective::Continue,
            CaptureOutcome::Restarted => CaptureDirective::Restart,
            CaptureOutcome::Ended | CaptureOutcome::Failed(_) => CaptureDirective::Released,
            CaptureOutcome::Ignored => CaptureDirective::Ignored,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CaptureEventResponse {
    pub directive: CaptureDirective,
    pub state: SessionState,
    pub counters: Counters,
}

#[derive(Debug, Serialize)]
pub struct DefinitionLookupResponse {
    pub word: String,
    pub text: Option<String>,
    pub pending: bool,
}

// =============================================================================
// Helpers
// =============================================================================

fn action_response(
    state: &AppState,
    session: &spotter_session::SessionController,
    with_capture: bool,
) -> SessionActionResponse {
    SessionActionResponse {
        success: true,
        state: session.state().clone(),
        status: session.status().to_string(),
        capture: with_capture.then(|| CaptureSettings {
            language: state.config.session.language.clone(),
            interim_results: state.config.session.interim_results,
        }),
    }
}

// =============================================================================
// Health and session
// =============================================================================

/// GET /health - liveness and uptime.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        started_at: state.started_at,
        dictionary: state.dictionary.name().to_string(),
    })
}

/// GET /session - full session snapshot.
pub async fn get_session(
    State(state): State<AppState>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.lock_session()?;
    Ok(Json(session.snapshot()))
}

/// POST /session/context - load keywords and request their definitions.
pub async fn load_context(
    State(state): State<AppState>,
    payload: Result<Json<ContextRequest>, JsonRejection>,
) -> Result<Json<ContextResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (result, keywords) = {
        let mut session = state.lock_session()?;
        let result = session.load_context(&request.context);
        state.publish(&mut session);
        (result, session.keywords().to_vec())
    };

    let ticket = result?;
    let version = ticket.version;
    state.spawn_definitions(ticket);

    Ok(Json(ContextResponse { keywords, version }))
}

/// POST /session/start - begin recording.
pub async fn start_session(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<SessionActionResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => StartRequest::default(),
        Err(e) => return Err(ApiError::BadRequest(e.body_text())),
    };
    if let Some(supported) = request.capture_supported {
        state.capture.set_supported(supported);
    }

    let (result, response) = {
        let mut session = state.lock_session()?;
        let result = session.start();
        state.publish(&mut session);
        (result, action_response(&state, &session, true))
    };

    result?;
    Ok(Json(response))
}

/// POST /session/stop - stop recording.
pub async fn stop_session(
    State(state): State<AppState>,
) -> Result<Json<SessionActionResponse>, ApiError> {
    let (result, response) = {
        let mut session = state.lock_session()?;
        let result = session.stop();
        state.publish(&mut session);
        (result, action_response(&state, &session, false))
    };

    result?;
    Ok(Json(response))
}

/// POST /session/clear - empty the transcript and reset counters.
pub async fn clear_session(
    State(state): State<AppState>,
) -> Result<Json<SessionActionResponse>, ApiError> {
    let mut session = state.lock_session()?;
    session.clear();
    state.publish(&mut session);
    Ok(Json(action_response(&state, &session, false)))
}

/// POST /session/error/dismiss - clear the error line.
pub async fn dismiss_error(
    State(state): State<AppState>,
) -> Result<Json<SessionActionResponse>, ApiError> {
    let mut session = state.lock_session()?;
    session.dismiss_error();
    Ok(Json(action_response(&state, &session, false)))
}

/// POST /session/events - capture engine event ingress.
pub async fn capture_event(
    State(state): State<AppState>,
    payload: Result<Json<CaptureEvent>, JsonRejection>,
) -> Result<Json<CaptureEventResponse>, ApiError> {
    let Json(event) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut session = state.lock_session()?;
    let outcome = session.handle_capture_event(event);
    state.publish(&mut session);
    Ok(Json(CaptureEventResponse {
        directive: CaptureDirective::from(&outcome),
        state: session.state().clone(),
        counters: session.counters(),
    }))
}

// =============================================================================
// Tooltip and definitions
// =============================================================================

/// POST /tooltip/hover - hover-enter over an annotated span.
pub async fn tooltip_hover(
    State(state): State<AppState>,
    payload: Result<Json<HoverRequest>, JsonRejection>,
) -> Result<Json<TooltipState>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut session = state.lock_session()?;
    Ok(Json(session.hover(&request.text, request.rect)))
}

/// POST /tooltip/exit - hover-exit.
pub async fn tooltip_exit(
    State(state): State<AppState>,
) -> Result<Json<Option<TooltipState>>, ApiError> {
    let mut session = state.lock_session()?;
    session.unhover();
    Ok(Json(None))
}

/// GET /definitions/{word} - cache lookup for one token.
pub async fn lookup_definition(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<Json<DefinitionLookupResponse>, ApiError> {
    if word.trim().is_empty() {
        return Err(ApiError::BadRequest("Word must not be empty".to_string()));
    }
    let lookup = state.lock_session()?.lookup(&word);
    Ok(Json(DefinitionLookupResponse {
        word,
        text: lookup.text,
        pending: lookup.pending,
    }))
}

/// POST /get_definitions - definition service endpoint.
///
/// Missing or blank keywords are a validation failure (400); anything the
/// backend cannot produce is a generation failure (500).
pub async fn get_definitions(
    State(state): State<AppState>,
    payload: Result<Json<DefinitionRequest>, JsonRejection>,
) -> Result<Json<DefinitionResponse>, (StatusCode, Json<ServiceErrorBody>)> {
    let keywords: Vec<String> = payload
        .map(|Json(request)| request.keywords)
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        return Err(service_error(StatusCode::BAD_REQUEST, "Missing keywords"));
    }

    match state.dictionary.define(&keywords).await {
        Ok(definitions) => Ok(Json(DefinitionResponse { definitions })),
        Err(err) if err.is_validation() => {
            tracing::warn!(error = %err, "Definition request rejected");
            Err(service_error(StatusCode::BAD_REQUEST, "Missing keywords"))
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                backend = state.dictionary.name(),
                "Definition generation failed"
            );
            Err(service_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate definitions",
            ))
        }
    }
}

fn service_error(status: StatusCode, message: &str) -> (StatusCode, Json<ServiceErrorBody>) {
    (
        status,
        Json(ServiceErrorBody {
            error: message.to_string(),
        }),
    )
}

// =============================================================================
// Streaming
// =============================================================================

/// GET /stream - SSE stream of session events.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send> {
    let rx = state.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().event("session").data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
