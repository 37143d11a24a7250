//! Action waiting errors
//!
//! Failure taxonomy for the waiting API: one action failed, one action ran
//! out of polling budget, a group wait gave up with partial results, the
//! server did not know some ids, or the transport itself failed.

use nimbus_domain::{Action, NimbusError};
use thiserror::Error;

/// Errors returned by single and batch action waits
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    /// The action finished with status `error`
    #[error("{}", describe("Action failed", .action))]
    Failed { action: Box<Action> },

    /// The polling budget ran out while the action was still running
    #[error("{}", describe("Action timed out", .action))]
    TimedOut { action: Box<Action> },

    /// A group wait ended with some actions timed out or failed
    #[error(transparent)]
    Group(#[from] GroupFailure),

    /// The server returned no state for some requested ids
    #[error("actions not found: {}", join_ids(.missing))]
    Lookup { missing: Vec<u64> },

    /// The transport failed; never retried by the waiting engine
    #[error(transparent)]
    Transport(#[from] NimbusError),
}

/// Per-action failures of a group wait plus the actions that did complete
#[derive(Debug, Clone, Error)]
#[error("{} actions failed or timed out ({} completed)", .failures.len(), .completed.len())]
pub struct GroupFailure {
    failures: Vec<ActionError>,
    completed: Vec<Action>,
}

impl GroupFailure {
    pub fn new(failures: Vec<ActionError>, completed: Vec<Action>) -> Self {
        Self { failures, completed }
    }

    /// Failures and timeouts, one per action that did not finish successfully
    pub fn failures(&self) -> &[ActionError] {
        &self.failures
    }

    /// Actions that reached a terminal state before the group gave up
    pub fn completed(&self) -> &[Action] {
        &self.completed
    }

    pub fn into_parts(self) -> (Vec<ActionError>, Vec<Action>) {
        (self.failures, self.completed)
    }
}

impl ActionError {
    pub fn failed(action: Action) -> Self {
        Self::Failed { action: Box::new(action) }
    }

    pub fn timed_out(action: Action) -> Self {
        Self::TimedOut { action: Box::new(action) }
    }

    /// The action this error is about, for `Failed` and `TimedOut`
    pub fn action(&self) -> Option<&Action> {
        match self {
            Self::Failed { action } | Self::TimedOut { action } => Some(action.as_ref()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// `<base>[: <error message>] (<error code or command>, <id>)`
fn describe(base: &str, action: &Action) -> String {
    let mut message = base.to_string();
    let mut extras = Vec::with_capacity(2);

    if let Some(error) = &action.error {
        message.push_str(": ");
        message.push_str(&error.message);
        extras.push(error.code.clone());
    } else if let Some(command) = &action.command {
        extras.push(command.clone());
    }
    extras.push(action.id.to_string());

    format!("{message} ({})", extras.join(", "))
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter().map(u64::to_string).collect::<Vec<_>>().join(", ")
}
