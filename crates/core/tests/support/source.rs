//! Scripted `ActionSource` for deterministic polling tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use nimbus_core::ActionSource;
use nimbus_domain::{Action, NimbusError, Result as DomainResult};

/// In-memory `ActionSource` that replays a per-action sequence of states.
///
/// Every lookup of an id pops its next scripted state; once the script is
/// exhausted the last state repeats. Lookups are recorded so tests can
/// assert on request volume.
#[derive(Default)]
pub struct ScriptedActionSource {
    scripts: Mutex<HashMap<u64, VecDeque<Action>>>,
    last: Mutex<HashMap<u64, Action>>,
    omitted: Mutex<HashSet<u64>>,
    failure: Mutex<Option<NimbusError>>,
    single_calls: Mutex<Vec<u64>>,
    batch_calls: Mutex<Vec<Vec<u64>>>,
}

impl ScriptedActionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the states returned for `id`, in order.
    pub fn with_script(self, id: u64, states: Vec<Action>) -> Self {
        self.scripts.lock().unwrap().insert(id, states.into());
        self
    }

    /// Leave `id` out of every batched response.
    pub fn omitting(self, id: u64) -> Self {
        self.omitted.lock().unwrap().insert(id);
        self
    }

    /// Fail every lookup with `error`.
    pub fn failing_with(self, error: NimbusError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn single_calls(&self) -> Vec<u64> {
        self.single_calls.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> Vec<Vec<u64>> {
        self.batch_calls.lock().unwrap().clone()
    }

    fn next_state(&self, id: u64) -> DomainResult<Action> {
        let scripted = self.scripts.lock().unwrap().get_mut(&id).and_then(VecDeque::pop_front);
        let mut last = self.last.lock().unwrap();

        match scripted {
            Some(action) => {
                last.insert(id, action.clone());
                Ok(action)
            }
            None => last
                .get(&id)
                .cloned()
                .ok_or_else(|| NimbusError::NotFound(format!("no script for action {id}"))),
        }
    }

    fn check_failure(&self) -> DomainResult<()> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActionSource for ScriptedActionSource {
    async fn fetch_action(&self, id: u64) -> DomainResult<Action> {
        self.single_calls.lock().unwrap().push(id);
        self.check_failure()?;
        self.next_state(id)
    }

    async fn fetch_actions(&self, ids: &[u64]) -> DomainResult<Vec<Action>> {
        self.batch_calls.lock().unwrap().push(ids.to_vec());
        self.check_failure()?;

        let omitted = self.omitted.lock().unwrap().clone();
        ids.iter().filter(|id| !omitted.contains(id)).map(|id| self.next_state(*id)).collect()
    }
}
