//! Client constants
//!
//! Centralized location for the defaults shared by the configuration
//! layer, the transport and the action polling engine.

// Endpoint and transport
pub const DEFAULT_ENDPOINT: &str = "https://api.nimbus.cloud/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
pub const CLIENT_NAME: &str = "nimbus";

// Action polling
/// Retry budget applied when a caller supplies neither `max_retries` nor a
/// timeout.
pub const DEFAULT_POLL_MAX_RETRIES: u32 = 120;
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 1.0;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_BACKOFF_CAP_SECS: f64 = 60.0;

/// Maximum number of `id` filters the API accepts per action list request.
pub const ACTIONS_BY_ID_PAGE_SIZE: usize = 25;
/// Page size used when walking every page of an action listing.
pub const ACTIONS_LIST_PER_PAGE: u32 = 50;
