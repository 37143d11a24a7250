//! Action polling
//!
//! Ports, timing primitives and the waiting engine for server-side
//! asynchronous operations.

pub mod errors;
pub mod interval;
pub mod ports;
pub mod service;
pub mod waiter;

pub use errors::{ActionError, GroupFailure};
pub use interval::PollInterval;
pub use ports::ActionSource;
pub use service::{collect_all, fail_fast, ActionWaiter, Observation, WaitOptions};
pub use waiter::Waiter;
