//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the token is missing or a value is invalid, falls back to a file
//! 3. Probes the standard paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `NIMBUS_TOKEN`: API token (required)
//! - `NIMBUS_ENDPOINT`: API base URL
//! - `NIMBUS_POLL_INTERVAL`: Seconds between action polls (fractional allowed)
//! - `NIMBUS_POLL_MAX_RETRIES`: Default retry budget for single-action waits
//! - `NIMBUS_REQUEST_TIMEOUT`: Per-request timeout in seconds
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./nimbus.json` or `./nimbus.toml` (current working directory)
//! 2. `$HOME/.config/nimbus/config.json` or `$HOME/.config/nimbus/config.toml`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use nimbus_domain::{ClientConfig, NimbusError, Result};

pub const ENV_TOKEN: &str = "NIMBUS_TOKEN";
pub const ENV_ENDPOINT: &str = "NIMBUS_ENDPOINT";
pub const ENV_POLL_INTERVAL: &str = "NIMBUS_POLL_INTERVAL";
pub const ENV_POLL_MAX_RETRIES: &str = "NIMBUS_POLL_MAX_RETRIES";
pub const ENV_REQUEST_TIMEOUT: &str = "NIMBUS_REQUEST_TIMEOUT";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If that fails, falls
/// back to loading from a config file.
///
/// # Errors
/// Returns `NimbusError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `NIMBUS_TOKEN` is required; every other setting keeps its default
/// when unset.
///
/// # Errors
/// Returns `NimbusError::Config` if the token is missing or a numeric
/// variable cannot be parsed.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var(ENV_TOKEN)?);

    if let Some(endpoint) = env_opt(ENV_ENDPOINT) {
        config.endpoint = endpoint;
    }
    if let Some(interval) = env_parse::<f64>(ENV_POLL_INTERVAL)? {
        if !interval.is_finite() || interval < 0.0 {
            return Err(NimbusError::Config(format!("Invalid poll interval: {interval}")));
        }
        config.poll.interval_secs = interval;
    }
    if let Some(max_retries) = env_parse::<u32>(ENV_POLL_MAX_RETRIES)? {
        config.poll.max_retries = max_retries;
    }
    if let Some(timeout) = env_parse::<u64>(ENV_REQUEST_TIMEOUT)? {
        config.request_timeout_secs = timeout;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `NimbusError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(NimbusError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            NimbusError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| NimbusError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`); a path
/// without an extension is read as JSON.
///
/// # Errors
/// Returns `NimbusError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| NimbusError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| NimbusError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(NimbusError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend([cwd.join("nimbus.json"), cwd.join("nimbus.toml")]);
    }

    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".config").join("nimbus");
        candidates.extend([dir.join("config.json"), dir.join("config.toml")]);
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `NimbusError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key)
        .ok_or_else(|| NimbusError::Config(format!("Missing required environment variable: {key}")))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `NimbusError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| NimbusError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
