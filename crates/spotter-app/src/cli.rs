//! CLI argument definitions for the Spotter application.
//!
//! Uses `clap` with derive macros for argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use spotter_core::config::SpotterConfig;

/// Spotter - live keyword spotting over a speech transcript, with definitions.
#[derive(Parser, Debug)]
#[command(name = "spotter", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Definition backend: "llm" or "remote".
    #[arg(long = "backend")]
    pub backend: Option<String>,

    /// URL of the remote definition service (implies --backend remote).
    #[arg(long = "endpoint")]
    pub endpoint: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SPOTTER_CONFIG env var > ~/.spotter/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SPOTTER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > SPOTTER_PORT env var > config file value > 3030.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("SPOTTER_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        3030
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Apply every override to a loaded configuration.
    pub fn apply(&self, config: &mut SpotterConfig) {
        config.general.port = self.resolve_port(config.general.port);
        config.general.log_level = self.resolve_log_level(&config.general.log_level);
        if let Some(ref endpoint) = self.endpoint {
            config.definitions.endpoint = endpoint.clone();
            config.definitions.backend = "remote".to_string();
        }
        if let Some(ref backend) = self.backend {
            config.definitions.backend = backend.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".spotter").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".spotter").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("spotter").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_parse() {
        let args = parse(&["-c", "/tmp/spotter.toml", "-p", "4000", "-l", "debug"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/spotter.toml")));
        assert_eq!(args.port, Some(4000));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_config_flag_wins() {
        let args = parse(&["--config", "custom.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_port_flag_wins_over_config() {
        let args = parse(&["--port", "5000"]);
        assert_eq!(args.resolve_port(8080), 5000);
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        let args = parse(&[]);
        assert_eq!(args.resolve_log_level("warn"), "warn");
        let args = parse(&["--log-level", "trace"]);
        assert_eq!(args.resolve_log_level("warn"), "trace");
    }

    #[test]
    fn test_endpoint_implies_remote_backend() {
        let args = parse(&["--endpoint", "http://dictionary.local/get_definitions"]);
        let mut config = SpotterConfig::default();
        args.apply(&mut config);
        assert_eq!(config.definitions.backend, "remote");
        assert_eq!(
            config.definitions.endpoint,
            "http://dictionary.local/get_definitions"
        );
    }

    #[test]
    fn test_explicit_backend_overrides_endpoint_default() {
        let args = parse(&["--endpoint", "http://x/get_definitions", "--backend", "llm"]);
        let mut config = SpotterConfig::default();
        args.apply(&mut config);
        assert_eq!(config.definitions.backend, "llm");
    }
}
