//! Action waiting engine
//!
//! Polls actions through an [`ActionSource`] until they reach a terminal
//! state.
//!
//! - [`ActionWaiter::wait_until_finished`] reloads one action until it is
//!   no longer running, bounded by a retry count or a timeout.
//! - [`ActionWaiter::wait_for_function`] tracks a set of actions, re-fetches
//!   every still-running action in one batched lookup per iteration and
//!   reports each fresh state to an observer.
//! - [`ActionWaiter::wait_for`] is the fail-fast variant: the first action
//!   that ends in `error` aborts the wait.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use nimbus_core::{ActionSource, ActionWaiter, PollInterval};
//! use nimbus_domain::Action;
//!
//! # async fn example(source: Arc<dyn ActionSource>) -> Result<(), nimbus_core::ActionError> {
//! let waiter = ActionWaiter::new(source).with_interval(PollInterval::exponential(Duration::from_secs(1)));
//! let finished = waiter
//!     .wait_for(vec![Action::from_id(1), Action::from_id(2)], Some(Duration::from_secs(300)))
//!     .await?;
//! assert_eq!(finished.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use nimbus_domain::constants::DEFAULT_POLL_MAX_RETRIES;
use nimbus_domain::{Action, ActionStatus, PollConfig};
use tracing::{debug, info, instrument, warn};

use super::errors::{ActionError, GroupFailure};
use super::interval::PollInterval;
use super::ports::ActionSource;
use super::waiter::Waiter;

/// Budget for a single-action wait
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up after this many reloads that still report `running`
    pub max_retries: Option<u32>,
    /// Give up once this much wall-clock time has passed
    pub timeout: Option<Duration>,
}

impl WaitOptions {
    pub fn max_retries(max_retries: u32) -> Self {
        Self { max_retries: Some(max_retries), timeout: None }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self { max_retries: None, timeout: Some(timeout) }
    }
}

/// Observer verdict for one fetched action state
#[derive(Debug)]
pub enum Observation {
    /// Keep waiting
    Continue,
    /// Stop waiting and return this error
    Abort(ActionError),
}

/// Observer that never aborts (collect-all mode).
pub fn collect_all(_action: &Action) -> Observation {
    Observation::Continue
}

/// Observer that aborts on the first action ending in `error`.
pub fn fail_fast(action: &Action) -> Observation {
    if action.status == ActionStatus::Error {
        Observation::Abort(ActionError::failed(action.clone()))
    } else {
        Observation::Continue
    }
}

/// Polls actions to completion through an [`ActionSource`]
#[derive(Clone)]
pub struct ActionWaiter {
    source: Arc<dyn ActionSource>,
    interval: PollInterval,
    default_max_retries: u32,
}

impl std::fmt::Debug for ActionWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionWaiter")
            .field("interval", &self.interval)
            .field("default_max_retries", &self.default_max_retries)
            .finish_non_exhaustive()
    }
}

impl ActionWaiter {
    /// Waiter with a one second constant interval and the default retry budget.
    pub fn new(source: Arc<dyn ActionSource>) -> Self {
        Self {
            source,
            interval: PollInterval::default(),
            default_max_retries: DEFAULT_POLL_MAX_RETRIES,
        }
    }

    /// Waiter configured from a client's poll settings.
    pub fn from_config(source: Arc<dyn ActionSource>, config: &PollConfig) -> Self {
        Self {
            source,
            interval: PollInterval::from_config(config),
            default_max_retries: config.max_retries,
        }
    }

    pub fn with_interval(mut self, interval: PollInterval) -> Self {
        self.interval = interval;
        self
    }

    /// Retry budget used when a caller gives neither `max_retries` nor a timeout
    pub fn with_default_max_retries(mut self, max_retries: u32) -> Self {
        self.default_max_retries = max_retries;
        self
    }

    pub fn interval(&self) -> &PollInterval {
        &self.interval
    }

    pub fn default_max_retries(&self) -> u32 {
        self.default_max_retries
    }

    /// Reload `action` until it leaves `running`.
    ///
    /// Returns the final state on `success`. Fails with
    /// [`ActionError::Failed`] on `error` and [`ActionError::TimedOut`] when
    /// the retry budget or the timeout runs out. With neither budget set the
    /// default retry budget applies, so polling is always bounded.
    ///
    /// # Errors
    ///
    /// Besides the outcomes above, transport errors are returned unchanged.
    #[instrument(skip(self, action), fields(action_id = action.id))]
    pub async fn wait_until_finished(
        &self,
        action: &Action,
        options: WaitOptions,
    ) -> Result<Action, ActionError> {
        let timeout = options.timeout.filter(|t| !t.is_zero());
        let retry_budget = match (options.max_retries, timeout) {
            (Some(max_retries), _) => Some(max_retries),
            (None, Some(_)) => None,
            (None, None) => Some(self.default_max_retries),
        };
        let waiter = Waiter::new(timeout);

        let mut retries: u32 = 0;
        let current = loop {
            let current = self.source.fetch_action(action.id).await?;
            if !current.is_running() {
                break current;
            }

            retries += 1;
            if retry_budget.is_some_and(|max_retries| retries >= max_retries) {
                warn!(retries, "action still running after retry budget");
                return Err(ActionError::timed_out(current));
            }

            debug!(retries, progress = ?current.progress, "action still running");
            if waiter.wait(self.interval.interval(retries)).await {
                warn!(retries, "action still running at deadline");
                return Err(ActionError::timed_out(current));
            }
        };

        if current.status == ActionStatus::Error {
            warn!(command = ?current.command, "action failed");
            return Err(ActionError::failed(current));
        }

        info!(retries, "action finished");
        Ok(current)
    }

    /// Wait until every action in `actions` reaches a terminal state.
    ///
    /// Each iteration sleeps, fetches all still-running actions in one
    /// batched lookup and passes every fresh state to `observer`. Returns
    /// the completed actions in the order they were seen finishing.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Group`] once the timeout passes, with one
    ///   [`ActionError::TimedOut`] per pending action and the actions that
    ///   already completed
    /// - [`ActionError::Lookup`] when the server omits a requested id
    /// - whatever the observer aborts with
    /// - transport errors, unchanged
    #[instrument(skip(self, actions, observer), fields(actions = actions.len()))]
    pub async fn wait_for_function<F>(
        &self,
        actions: Vec<Action>,
        mut observer: F,
        timeout: Option<Duration>,
    ) -> Result<Vec<Action>, ActionError>
    where
        F: FnMut(&Action) -> Observation + Send,
    {
        let waiter = Waiter::new(timeout);
        let mut pending = dedup_by_id(actions);
        let mut completed = Vec::with_capacity(pending.len());
        let mut retries: u32 = 0;

        while !pending.is_empty() {
            if waiter.wait(self.interval.interval(retries)).await {
                warn!(pending = pending.len(), completed = completed.len(), "action group timed out");
                let failures = pending.into_iter().map(ActionError::timed_out).collect();
                return Err(GroupFailure::new(failures, completed).into());
            }
            retries += 1;

            let ids: Vec<u64> = pending.iter().map(|a| a.id).collect();
            let fetched = self.fetch_exact(&ids).await?;

            let mut still_running = Vec::with_capacity(fetched.len());
            for action in fetched {
                let observation = observer(&action);
                if action.is_running() {
                    still_running.push(action);
                } else {
                    completed.push(action);
                }

                if let Observation::Abort(err) = observation {
                    warn!(error = %err, "action group wait aborted by observer");
                    return Err(err);
                }
            }

            debug!(
                retries,
                pending = still_running.len(),
                completed = completed.len(),
                "action group poll"
            );
            pending = still_running;
        }

        info!(completed = completed.len(), retries, "action group finished");
        Ok(completed)
    }

    /// Fail-fast group wait: aborts with [`ActionError::Failed`] on the first
    /// action that ends in `error`.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_for_function`].
    pub async fn wait_for(
        &self,
        actions: Vec<Action>,
        timeout: Option<Duration>,
    ) -> Result<Vec<Action>, ActionError> {
        self.wait_for_function(actions, fail_fast, timeout).await
    }

    /// Collect-all group wait: returns every completed action, whatever its
    /// status.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_for_function`].
    pub async fn wait_for_all(
        &self,
        actions: Vec<Action>,
        timeout: Option<Duration>,
    ) -> Result<Vec<Action>, ActionError> {
        self.wait_for_function(actions, collect_all, timeout).await
    }

    /// Fetch `ids`, keeping exactly one state per requested id.
    async fn fetch_exact(&self, ids: &[u64]) -> Result<Vec<Action>, ActionError> {
        let fetched = self.source.fetch_actions(ids).await?;

        let requested: HashSet<u64> = ids.iter().copied().collect();
        let mut seen = HashSet::with_capacity(ids.len());
        let mut actions = Vec::with_capacity(ids.len());
        for action in fetched {
            if requested.contains(&action.id) && seen.insert(action.id) {
                actions.push(action);
            } else {
                debug!(action_id = action.id, "ignoring unrequested or duplicate action");
            }
        }

        if actions.len() != ids.len() {
            let missing: Vec<u64> = ids.iter().copied().filter(|id| !seen.contains(id)).collect();
            return Err(ActionError::Lookup { missing });
        }

        Ok(actions)
    }
}

fn dedup_by_id(actions: Vec<Action>) -> Vec<Action> {
    let mut seen = HashSet::with_capacity(actions.len());
    actions.into_iter().filter(|a| seen.insert(a.id)).collect()
}
