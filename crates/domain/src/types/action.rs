//! Action entity
//!
//! An action is a server-tracked asynchronous operation (starting a
//! server, attaching a volume, ...). The client only ever reads actions:
//! they come from API responses or from a caller-supplied id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_status_conversions;

/// Lifecycle status of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Running,
    Success,
    Error,
}

impl_status_conversions!(ActionStatus {
    Running => "running",
    Success => "success",
    Error => "error",
});

impl ActionStatus {
    /// `success` and `error` are terminal; `running` is not.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Resource affected by an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResource {
    pub id: u64,
    #[serde(rename = "type")]
    pub resource_type: String,
}

/// Structured error attached to an action whose status is `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Asynchronous operation performed by the remote system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    pub command: Option<String>,
    pub status: ActionStatus,
    pub progress: Option<u8>,
    pub started: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resources: Vec<ActionResource>,
    pub error: Option<ActionErrorDetails>,
}

/// Single-action response body (`{"action": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ActionEnvelope {
    pub action: Action,
}

/// Violations of the status/finished/error consistency rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionInvariantViolation {
    #[error("action {0} is running but has a finished timestamp")]
    RunningWithFinished(u64),

    #[error("action {0} is terminal but has no finished timestamp")]
    TerminalWithoutFinished(u64),

    #[error("action {0} carries an error payload but its status is {1}")]
    ErrorPayloadWithoutErrorStatus(u64, ActionStatus),
}

impl Action {
    /// Reference to an action known only by its id.
    ///
    /// Used as a polling key; the first reload replaces every other field.
    pub fn from_id(id: u64) -> Self {
        Self {
            id,
            command: None,
            status: ActionStatus::Running,
            progress: None,
            started: None,
            finished: None,
            resources: Vec::new(),
            error: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ActionStatus::Running
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check `running <=> finished is null` and `error => status == error`.
    pub fn check_invariants(&self) -> Result<(), ActionInvariantViolation> {
        match (self.status, self.finished.is_some()) {
            (ActionStatus::Running, true) => {
                return Err(ActionInvariantViolation::RunningWithFinished(self.id));
            }
            (ActionStatus::Success | ActionStatus::Error, false) => {
                return Err(ActionInvariantViolation::TerminalWithoutFinished(self.id));
            }
            _ => {}
        }

        if self.error.is_some() && self.status != ActionStatus::Error {
            return Err(ActionInvariantViolation::ErrorPayloadWithoutErrorStatus(
                self.id,
                self.status,
            ));
        }

        Ok(())
    }
}
