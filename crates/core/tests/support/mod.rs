//! Shared test helpers for `nimbus-core` integration tests.
//!
//! Provides a scripted in-memory `ActionSource` and action fixtures so the
//! waiting tests can focus on polling behaviour instead of HTTP plumbing.

#![allow(dead_code)]

pub mod source;

use chrono::Utc;
use nimbus_domain::{Action, ActionErrorDetails, ActionStatus};

pub use source::ScriptedActionSource;

/// Running action with a command name.
pub fn running(id: u64) -> Action {
    let mut action = Action::from_id(id);
    action.command = Some("start_server".into());
    action.started = Some(Utc::now());
    action.progress = Some(0);
    action
}

/// Running action reporting `progress` percent.
pub fn running_at(id: u64, progress: u8) -> Action {
    let mut action = running(id);
    action.progress = Some(progress);
    action
}

pub fn success(id: u64) -> Action {
    let mut action = running(id);
    action.status = ActionStatus::Success;
    action.progress = Some(100);
    action.finished = Some(Utc::now());
    action
}

pub fn error(id: u64) -> Action {
    let mut action = running(id);
    action.status = ActionStatus::Error;
    action.progress = Some(100);
    action.finished = Some(Utc::now());
    action.error = Some(ActionErrorDetails {
        code: "action_failed".into(),
        message: "Action failed".into(),
        details: None,
    });
    action
}
