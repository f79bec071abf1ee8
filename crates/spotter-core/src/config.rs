use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SpotterError};

/// Top-level configuration for the Spotter application.
///
/// Loaded from `~/.spotter/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub definitions: DefinitionsConfig,
    #[serde(default)]
    pub tooltip: TooltipConfig,
}

impl SpotterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SpotterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SpotterError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// API server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            log_level: "info".to_string(),
        }
    }
}

/// Recording session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recognition language handed to the capture engine.
    pub language: String,
    /// Whether the capture engine should deliver interim fragments.
    pub interim_results: bool,
    /// Restart the capture engine when it ends on its own while recording.
    pub auto_restart: bool,
    /// Consecutive restarts allowed without a fragment in between (0 = unlimited).
    pub max_auto_restarts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: true,
            auto_restart: true,
            max_auto_restarts: 0,
        }
    }
}

/// Definition lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionsConfig {
    /// Backend: "llm" (generate in-process) or "remote" (call `endpoint`).
    pub backend: String,
    /// URL of a remote definition service speaking the `/get_definitions` contract.
    pub endpoint: String,
    /// Base URL of the OpenAI-compatible chat completions API.
    pub api_base: String,
    /// Model used for definition generation.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature for generation.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self {
            backend: "llm".to_string(),
            endpoint: "http://127.0.0.1:3030/get_definitions".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

/// Tooltip presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Vertical gap between the hovered element and the tooltip, in pixels.
    pub offset_px: f64,
    /// Text shown while a definition request is outstanding.
    pub loading_text: String,
    /// Text shown when no definition could be obtained.
    pub unavailable_text: String,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_px: 10.0,
            loading_text: "Loading definition...".to_string(),
            unavailable_text: "Definition unavailable".to_string(),
        }
    }
}
