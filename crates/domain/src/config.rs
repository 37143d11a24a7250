//! Client configuration structures
//!
//! Loaded by `nimbus-infra::config` from the environment or a JSON/TOML
//! file. Every field except the token has a default.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLIENT_NAME, DEFAULT_BACKOFF_CAP_SECS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_ENDPOINT,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub token: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub application_name: Option<String>,
    #[serde(default)]
    pub application_version: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_http_max_attempts")]
    pub http_max_attempts: usize,
    #[serde(default)]
    pub poll: PollConfig,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: default_endpoint(),
            application_name: None,
            application_version: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            http_max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            poll: PollConfig::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_application(mut self, name: impl Into<String>, version: Option<String>) -> Self {
        self.application_name = Some(name.into());
        self.application_version = version;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// `User-Agent` header: optional `name/version` followed by the client name.
    pub fn user_agent(&self) -> String {
        let client = format!("{}/{}", CLIENT_NAME, env!("CARGO_PKG_VERSION"));
        match (&self.application_name, &self.application_version) {
            (Some(name), Some(version)) => format!("{name}/{version} {client}"),
            (Some(name), None) => format!("{name} {client}"),
            _ => client,
        }
    }
}

/// How the sleep between polls grows with the retry count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffConfig {
    Constant,
    Exponential {
        #[serde(default = "default_backoff_multiplier")]
        multiplier: f64,
        #[serde(default = "default_backoff_cap_secs")]
        cap_secs: f64,
        #[serde(default)]
        jitter: bool,
    },
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::Constant
    }
}

/// Action polling settings shared by every wait call of a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: f64,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default = "default_poll_max_retries")]
    pub max_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            backoff: BackoffConfig::default(),
            max_retries: DEFAULT_POLL_MAX_RETRIES,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_http_max_attempts() -> usize {
    DEFAULT_HTTP_MAX_ATTEMPTS
}

fn default_poll_interval_secs() -> f64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_poll_max_retries() -> u32 {
    DEFAULT_POLL_MAX_RETRIES
}

fn default_backoff_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

fn default_backoff_cap_secs() -> f64 {
    DEFAULT_BACKOFF_CAP_SECS
}
