//! Nimbus API clients
//!
//! - [`ApiClient`] sends authenticated JSON requests over [`crate::http::HttpClient`]
//! - [`ActionsClient`] reads actions and drives the waiting engine from
//!   `nimbus-core`
//!
//! Structured tracing only; every request runs under the configured
//! request timeout.

pub mod actions;
pub mod client;

pub use actions::ActionsClient;
pub use client::{ApiClient, CORRELATION_ID_HEADER};
