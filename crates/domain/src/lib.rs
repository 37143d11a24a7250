//! # Nimbus Domain
//!
//! Domain types and models for the Nimbus cloud API client.
//!
//! This crate contains:
//! - Action entity and its status/resource/error payloads
//! - List and pagination types for action endpoints
//! - Client configuration structures
//! - Domain error types and Result definitions
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Nimbus crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
