//! Integration tests for the Spotter API.
//!
//! Every test builds its own state with a fake dictionary and drives the
//! router through `oneshot`, covering happy and error paths of each route.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

use spotter_api::create_router;
use spotter_api::handlers::HealthResponse;
use spotter_api::state::AppState;
use spotter_core::config::SpotterConfig;
use spotter_definitions::{DefinitionError, Definitions, DictionaryService};
use spotter_session::{CaptureEngine, SessionEvent};

// =============================================================================
// Helpers
// =============================================================================

/// Dictionary that answers with a fixed result, optionally after a gate opens.
struct FakeDictionary {
    result: Result<Definitions, DefinitionError>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl DictionaryService for FakeDictionary {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn define(&self, _keywords: &[String]) -> Result<Definitions, DefinitionError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result.clone()
    }
}

fn cat_definitions() -> Definitions {
    let mut definitions = Definitions::new();
    definitions.insert("cat".to_string(), "a small domesticated feline".to_string());
    definitions
}

fn make_state_with(result: Result<Definitions, DefinitionError>) -> AppState {
    let dictionary = FakeDictionary { result, gate: None };
    AppState::new(SpotterConfig::default(), Arc::new(dictionary))
}

fn make_state() -> AppState {
    make_state_with(Ok(cat_definitions()))
}

fn make_gated_state() -> (AppState, Arc<Notify>) {
    let gate = Arc::new(Notify::new());
    let dictionary = FakeDictionary {
        result: Ok(cat_definitions()),
        gate: Some(Arc::clone(&gate)),
    };
    (
        AppState::new(SpotterConfig::default(), Arc::new(dictionary)),
        gate,
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

/// Send one request and return the status and JSON body.
async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let resp = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn load(state: &AppState, context: &str) -> (StatusCode, Value) {
    send(state, post_json("/session/context", json!({ "context": context }))).await
}

async fn fragment(state: &AppState, text: &str, kind: &str) -> (StatusCode, Value) {
    send(
        state,
        post_json(
            "/session/events",
            json!({"type": "fragment", "text": text, "kind": kind}),
        ),
    )
    .await
}

async fn hover(state: &AppState, text: &str) -> (StatusCode, Value) {
    send(
        state,
        post_json(
            "/tooltip/hover",
            json!({
                "text": text,
                "rect": {"left": 100.0, "top": 200.0, "width": 40.0, "height": 18.0}
            }),
        ),
    )
    .await
}

/// Poll the session until the definition request has settled.
async fn wait_for_definitions(state: &AppState) -> Value {
    for _ in 0..100 {
        let (_, session) = send(state, get("/session")).await;
        if session["definitions_loading"] == false {
            return session;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("definitions never settled");
}

// =============================================================================
// Health and session
// =============================================================================

#[tokio::test]
async fn test_health() {
    let state = make_state();
    let resp = create_router(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.dictionary, "fake");
}

#[tokio::test]
async fn test_initial_session_snapshot() {
    let state = make_state();
    let (status, body) = send(&state, get("/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["state"], "ready");
    assert_eq!(body["status"], "Ready");
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["counters"], json!({"total_words": 0, "matched_words": 0}));
    assert_eq!(body["transcript"], json!([]));
}

// =============================================================================
// Context
// =============================================================================

#[tokio::test]
async fn test_load_context() {
    let state = make_state();
    let (status, body) = load(&state, "Cat, dog  cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keywords"], json!(["cat", "dog"]));
    assert_eq!(body["version"], 1);

    let session = wait_for_definitions(&state).await;
    assert_eq!(session["status"], "Context loaded");
    assert_eq!(session["definitions"][0]["key"], "cat");
    assert_eq!(
        session["definitions"][0]["text"],
        "a small domesticated feline"
    );
    assert_eq!(session["definitions"][1]["text"], Value::Null);
}

#[tokio::test]
async fn test_load_empty_context() {
    let state = make_state();
    let (status, body) = load(&state, "  ,  ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["message"], "Please enter context text");

    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["error"], "Please enter context text");
    assert_eq!(session["keywords"], json!([]));
}

#[tokio::test]
async fn test_load_context_invalid_body() {
    let state = make_state();
    let (status, _) = send(&state, post_json("/session/context", json!({"text": "cat"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Recording lifecycle
// =============================================================================

#[tokio::test]
async fn test_start_without_keywords() {
    let state = make_state();
    let (status, body) = send(&state, post_empty("/session/start")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Please load context first");
    assert!(!state.capture.is_active());
}

#[tokio::test]
async fn test_start_capture_unsupported() {
    let state = make_state();
    load(&state, "cat").await;

    let (status, body) = send(
        &state,
        post_json("/session/start", json!({"capture_supported": false})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["message"],
        "Speech recognition is not supported in this environment"
    );

    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["state"]["state"], "ready");
}

#[tokio::test]
async fn test_start_and_stop() {
    let state = make_state();
    load(&state, "cat").await;

    let (status, body) = send(&state, post_empty("/session/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["state"], "recording");
    assert_eq!(body["status"], "Recording...");
    assert_eq!(body["capture"]["language"], "en-US");
    assert_eq!(body["capture"]["interim_results"], true);
    assert!(state.capture.is_active());

    let (status, _) = send(&state, post_empty("/session/start")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&state, post_empty("/session/stop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["state"], "stopped");
    assert_eq!(body["status"], "Stopped");
    assert!(body.get("capture").is_none());
    assert!(!state.capture.is_active());
}

#[tokio::test]
async fn test_stop_when_not_recording() {
    let state = make_state();
    let (status, body) = send(&state, post_empty("/session/stop")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_start_malformed_body() {
    let state = make_state();
    load(&state, "cat").await;
    let resp = create_router(state.clone())
        .oneshot(
            Request::post("/session/start")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Capture events
// =============================================================================

#[tokio::test]
async fn test_final_fragment_is_annotated() {
    let state = make_state();
    load(&state, "cat, dog").await;
    send(&state, post_empty("/session/start")).await;

    let (status, body) = fragment(&state, "The cat ran.", "final").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["directive"], "continue");
    assert_eq!(body["counters"], json!({"total_words": 3, "matched_words": 1}));

    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(
        session["transcript"],
        json!([
            {"kind": "plain", "text": "The"},
            {"kind": "match", "text": "cat"},
            {"kind": "plain", "text": "ran."}
        ])
    );
}

#[tokio::test]
async fn test_interim_fragment_is_provisional() {
    let state = make_state();
    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;

    let (_, body) = fragment(&state, "the ca", "interim").await;
    assert_eq!(body["counters"]["total_words"], 0);

    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["provisional"], "the ca");

    fragment(&state, "the cat", "final").await;
    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["provisional"], Value::Null);
    assert_eq!(session["counters"]["total_words"], 2);
}

#[tokio::test]
async fn test_end_of_stream_restarts_capture() {
    let state = make_state();
    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;
    assert_eq!(state.capture.acquisitions(), 1);

    let (status, body) = send(&state, post_json("/session/events", json!({"type": "end"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["directive"], "restart");
    assert_eq!(body["state"]["state"], "recording");
    assert_eq!(state.capture.acquisitions(), 2);
}

#[tokio::test]
async fn test_engine_error_releases_capture() {
    let state = make_state();
    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;
    fragment(&state, "cat", "final").await;

    let (_, body) = send(
        &state,
        post_json("/session/events", json!({"type": "error", "message": "network"})),
    )
    .await;
    assert_eq!(body["directive"], "released");
    assert_eq!(body["state"], json!({"state": "error", "message": "network"}));
    assert_eq!(body["counters"]["matched_words"], 1);
    assert!(!state.capture.is_active());

    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["error"], "Speech recognition error: network");

    let (status, _) = send(&state, post_empty("/session/error/dismiss")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["error"], Value::Null);
}

#[tokio::test]
async fn test_events_outside_recording_are_ignored() {
    let state = make_state();
    load(&state, "cat").await;

    let (_, body) = fragment(&state, "cat", "final").await;
    assert_eq!(body["directive"], "ignored");
    assert_eq!(body["counters"]["total_words"], 0);
}

#[tokio::test]
async fn test_malformed_capture_event() {
    let state = make_state();
    let (status, _) = send(
        &state,
        post_json("/session/events", json!({"type": "unknown"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_resets_transcript() {
    let state = make_state();
    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;
    fragment(&state, "cat cat dog", "final").await;

    let (status, body) = send(&state, post_empty("/session/clear")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Transcript cleared");
    assert_eq!(body["state"]["state"], "recording");

    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["counters"], json!({"total_words": 0, "matched_words": 0}));
    assert_eq!(session["transcript"], json!([]));
    assert_eq!(session["keywords"], json!(["cat"]));
}

// =============================================================================
// Tooltip and definitions
// =============================================================================

#[tokio::test]
async fn test_hover_shows_loading_then_definition() {
    let (state, gate) = make_gated_state();
    load(&state, "cat, dog").await;
    send(&state, post_empty("/session/start")).await;
    fragment(&state, "The cat ran.", "final").await;

    let (status, body) = hover(&state, "cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Loading definition...");
    assert_eq!(body["x"], 120.0);
    assert_eq!(body["y"], 190.0);

    gate.notify_one();
    wait_for_definitions(&state).await;

    let (_, body) = hover(&state, "cat").await;
    assert_eq!(body["text"], "a small domesticated feline");
    let (_, body) = hover(&state, "dog").await;
    assert_eq!(body["text"], "Definition unavailable");

    let (status, body) = send(&state, post_empty("/tooltip/exit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    let (_, session) = send(&state, get("/session")).await;
    assert_eq!(session["tooltip"], Value::Null);
}

#[tokio::test]
async fn test_definition_failure_degrades_gracefully() {
    let state = make_state_with(Err(DefinitionError::Generation("offline".to_string())));
    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;

    let session = wait_for_definitions(&state).await;
    assert!(session["definitions_error"].is_string());
    assert_eq!(session["error"], Value::Null);
    assert_eq!(session["state"]["state"], "recording");

    let (_, body) = hover(&state, "cat").await;
    assert_eq!(body["text"], "Definition unavailable");

    let (_, body) = fragment(&state, "cat", "final").await;
    assert_eq!(body["counters"]["matched_words"], 1);
}

#[tokio::test]
async fn test_lookup_definition() {
    let state = make_state();
    load(&state, "cat").await;
    wait_for_definitions(&state).await;

    let (status, body) = send(&state, get("/definitions/Cat.")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["word"], "Cat.");
    assert_eq!(body["text"], "a small domesticated feline");
    assert_eq!(body["pending"], false);

    let (_, body) = send(&state, get("/definitions/zebra")).await;
    assert_eq!(body["text"], Value::Null);
    assert_eq!(body["pending"], false);
}

// =============================================================================
// Definition service endpoint
// =============================================================================

#[tokio::test]
async fn test_get_definitions_success() {
    let state = make_state();
    let (status, body) = send(
        &state,
        post_json("/get_definitions", json!({"keywords": ["cat", "dog"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"definitions": {"cat": "a small domesticated feline"}})
    );
}

#[tokio::test]
async fn test_get_definitions_missing_keywords() {
    let state = make_state();
    for payload in [json!({}), json!({"keywords": []}), json!({"keywords": ["  "]})] {
        let (status, body) = send(&state, post_json("/get_definitions", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing keywords"}));
    }

    let (status, body) = send(&state, post_empty("/get_definitions")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing keywords"}));
}

#[tokio::test]
async fn test_get_definitions_generation_failure() {
    let state = make_state_with(Err(DefinitionError::Generation("offline".to_string())));
    let (status, body) = send(
        &state,
        post_json("/get_definitions", json!({"keywords": ["cat"]})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to generate definitions"}));
}

// =============================================================================
// Event stream
// =============================================================================

#[tokio::test]
async fn test_events_are_broadcast() {
    let state = make_state();
    let mut rx = state.event_tx.subscribe();

    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;
    fragment(&state, "cat", "final").await;

    let mut received = Vec::new();
    while let Ok(event) = rx.try_recv() {
        received.push(event);
    }
    assert!(matches!(received[0], SessionEvent::ContextLoaded { .. }));
    assert!(received
        .iter()
        .any(|e| matches!(e, SessionEvent::StateChanged { .. })));
    assert!(received
        .iter()
        .any(|e| matches!(e, SessionEvent::FragmentAnnotated { match_delta: 1, .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_fragments_publish_counters_in_order() {
    let state = make_state();
    load(&state, "cat").await;
    send(&state, post_empty("/session/start")).await;
    let mut rx = state.event_tx.subscribe();

    let mut handles = Vec::new();
    for _ in 0..200 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            fragment(&state, "a cat", "final").await
        }));
    }
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let mut totals = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::FragmentAnnotated { counters, .. } = event {
            totals.push(counters.total_words);
        }
    }
    assert_eq!(totals.len(), 200);
    assert!(totals.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(totals.last().copied(), Some(400));
}

#[tokio::test]
async fn test_stream_endpoint_is_event_stream() {
    let state = make_state();
    let resp = create_router(state).oneshot(get("/stream")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));
}
