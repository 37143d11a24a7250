//! Shared helpers for `nimbus-infra` integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use nimbus_domain::{ClientConfig, PollConfig};
use nimbus_infra::ActionsClient;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use wiremock::{MockServer, Request, ResponseTemplate};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Filter with `RUST_LOG`, e.g. `RUST_LOG=nimbus_core=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Actions client against `server` with a fast constant poll interval.
pub fn actions_client(server: &MockServer) -> ActionsClient {
    init_tracing();
    let poll = PollConfig { interval_secs: 0.01, ..PollConfig::default() };
    let config = ClientConfig::new("test-token").with_endpoint(server.uri()).with_poll(poll);
    ActionsClient::from_config(&config).expect("actions client")
}

/// JSON representation of an action in `status`.
pub fn action_json(id: u64, status: &str) -> Value {
    let terminal = status != "running";
    let error = if status == "error" {
        json!({"code": "action_failed", "message": "Action failed"})
    } else {
        Value::Null
    };
    json!({
        "id": id,
        "command": "create_server",
        "status": status,
        "progress": if terminal { 100 } else { 40 },
        "started": "2024-01-01T00:00:00Z",
        "finished": if terminal { json!("2024-01-01T00:01:00Z") } else { Value::Null },
        "resources": [],
        "error": error
    })
}

/// Ids requested through repeated `id` query parameters.
pub fn requested_ids(request: &Request) -> Vec<u64> {
    request
        .url
        .query_pairs()
        .filter(|(key, _)| key == "id")
        .filter_map(|(_, value)| value.parse().ok())
        .collect()
}

/// Responder for `GET /actions?id=..` that replays a status script per id.
///
/// Each lookup of an id advances its script; the last status repeats. Ids
/// without a script are left out of the response.
#[derive(Clone, Default)]
pub struct ActionsResponder {
    scripts: Arc<Mutex<HashMap<u64, Vec<&'static str>>>>,
}

impl ActionsResponder {
    pub fn with_script(self, id: u64, statuses: &[&'static str]) -> Self {
        let mut script = statuses.to_vec();
        script.reverse();
        self.scripts.lock().unwrap().insert(id, script);
        self
    }

    pub fn next_status(&self, id: u64) -> Option<&'static str> {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.get_mut(&id)?;
        if script.len() > 1 {
            script.pop()
        } else {
            script.last().copied()
        }
    }

    pub fn respond(&self, request: &Request) -> ResponseTemplate {
        let actions: Vec<Value> = requested_ids(request)
            .into_iter()
            .filter_map(|id| self.next_status(id).map(|status| action_json(id, status)))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "actions": actions }))
    }
}
