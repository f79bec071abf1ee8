//! Spotter application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the definition backend (LLM generator or remote service)
//! 4. Start the axum API server that hosts the recording session

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use spotter_api::routes;
use spotter_api::state::AppState;
use spotter_core::config::{DefinitionsConfig, SpotterConfig};
use spotter_core::error::SpotterError;
use spotter_definitions::{DictionaryService, HttpDictionaryClient, LlmDictionary};

use cli::CliArgs;

/// Build the dictionary backend named in the config.
fn build_dictionary(
    definitions: &DefinitionsConfig,
    port: u16,
) -> Result<Arc<dyn DictionaryService>, SpotterError> {
    match definitions.backend.as_str() {
        "llm" => Ok(Arc::new(LlmDictionary::from_config(definitions))),
        "remote" => {
            // This server answers /get_definitions through the backend, so
            // pointing the backend at ourselves would recurse.
            let own = [
                format!("http://127.0.0.1:{}/get_definitions", port),
                format!("http://localhost:{}/get_definitions", port),
            ];
            if own.iter().any(|url| url == definitions.endpoint.trim_end_matches('/')) {
                return Err(SpotterError::Config(format!(
                    "remote definition endpoint {} is this server",
                    definitions.endpoint
                )));
            }
            Ok(Arc::new(HttpDictionaryClient::new(
                definitions.endpoint.clone(),
                Duration::from_secs(definitions.timeout_secs),
            )))
        }
        other => Err(SpotterError::Config(format!(
            "unknown definition backend '{}' (expected 'llm' or 'remote')",
            other
        ))),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply; the
    // outcome is logged below once the subscriber is installed.
    let config_file = args.resolve_config_path();
    let loaded = SpotterConfig::load(&config_file);
    let config_level = loaded
        .as_ref()
        .map(|c| c.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(args.resolve_log_level(&config_level))
            }),
        )
        .init();

    tracing::info!("Starting Spotter v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %e,
                "Failed to load config. Using defaults."
            );
            SpotterConfig::default()
        }
    };
    args.apply(&mut config);

    // Definition backend.
    let dictionary = build_dictionary(&config.definitions, config.general.port)?;
    tracing::info!(backend = dictionary.name(), "Definition backend ready");

    // === API server ===
    let state = AppState::new(config.clone(), dictionary);
    tracing::info!(
        port = config.general.port,
        language = %config.session.language,
        "Session ready"
    );

    if let Err(e) = routes::start_server(&config, state).await {
        tracing::error!(error = %e, "API server stopped");
        tracing::error!("Try: SPOTTER_PORT={} spotter", config.general.port.saturating_add(1));
        return Err(e.into());
    }

    Ok(())
}
