//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression,
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use spotter_core::config::SpotterConfig;
use spotter_core::error::SpotterError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Allow the overlay page when served from the configured port or the
    // next one up (dev server).
    let port = state.config.general.port;
    let dev_port = port.saturating_add(1);
    let origins: Vec<HeaderValue> = [port, dev_port]
        .iter()
        .flat_map(|p| {
            [
                format!("http://127.0.0.1:{}", p),
                format!("http://localhost:{}", p),
            ]
        })
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let session_routes = Router::new()
        .route("/session", get(handlers::get_session))
        .route(
            "/session/context",
            post(handlers::load_context).layer(DefaultBodyLimit::max(64 * 1024)),
        )
        .route("/session/start", post(handlers::start_session))
        .route("/session/stop", post(handlers::stop_session))
        .route("/session/clear", post(handlers::clear_session))
        .route("/session/error/dismiss", post(handlers::dismiss_error))
        .route("/session/events", post(handlers::capture_event));

    let tooltip_routes = Router::new()
        .route("/tooltip/hover", post(handlers::tooltip_hover))
        .route("/tooltip/exit", post(handlers::tooltip_exit))
        .route("/definitions/{word}", get(handlers::lookup_definition));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/get_definitions", post(handlers::get_definitions))
        .route("/stream", get(handlers::stream))
        .merge(session_routes)
        .merge(tooltip_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured port.
///
/// Binds to 127.0.0.1 (localhost only).
pub async fn start_server(config: &SpotterConfig, state: AppState) -> Result<(), SpotterError> {
    let addr = format!("127.0.0.1:{}", config.general.port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SpotterError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| SpotterError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
