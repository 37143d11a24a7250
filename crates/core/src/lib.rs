//! # Nimbus Core
//!
//! Action polling and completion waiting - no infrastructure dependencies.
//!
//! This crate contains:
//! - The `ActionSource` port that resource clients implement
//! - The deadline-aware `Waiter` and the poll interval policy
//! - Single-action and batch waiting built on top of them
//! - The action error taxonomy (failed, timed out, group, lookup)
//!
//! ## Architecture Principles
//! - Only depends on `nimbus-domain`
//! - No HTTP code; actions are fetched through the port
//! - Each wait call owns its working set; nothing is shared across calls

pub mod actions;

// Re-export specific items to avoid ambiguity
pub use actions::errors::{ActionError, GroupFailure};
pub use actions::interval::PollInterval;
pub use actions::ports::ActionSource;
pub use actions::service::{collect_all, fail_fast, ActionWaiter, Observation, WaitOptions};
pub use actions::waiter::Waiter;
