//! Domain types and models
//!
//! Wire-compatible representations of the API resources this client
//! works with.

pub mod action;
pub mod pagination;

pub use action::{
    Action, ActionEnvelope, ActionErrorDetails, ActionInvariantViolation, ActionResource,
    ActionStatus,
};
pub use pagination::{ActionListParams, ActionsPage, Meta, Pagination};
