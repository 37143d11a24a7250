//! # Nimbus Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The retrying reqwest-based HTTP transport
//! - The authenticated JSON API client
//! - The actions resource client (implements `ActionSource`)
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `nimbus-core`
//! - Depends on `nimbus-domain` and `nimbus-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{ActionsClient, ApiClient};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
