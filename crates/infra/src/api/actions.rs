//! Actions resource client
//!
//! Reads actions from `/actions` (or a resource-scoped `<resource>/actions`
//! path) and implements [`ActionSource`] so the polling engine in
//! `nimbus-core` can drive waits over HTTP. Batch lookups are split into
//! chunks of [`ACTIONS_BY_ID_PAGE_SIZE`] ids, one request per chunk.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nimbus_core::{ActionError, ActionSource, ActionWaiter, Observation, WaitOptions};
use nimbus_domain::constants::{ACTIONS_BY_ID_PAGE_SIZE, ACTIONS_LIST_PER_PAGE};
use nimbus_domain::{
    Action, ActionEnvelope, ActionListParams, ActionStatus, ActionsPage, ClientConfig, NimbusError,
    PollConfig, Result,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::client::ApiClient;
use crate::errors::InfraError;

const ROOT_ACTIONS_PATH: &str = "/actions";

/// Client for the actions endpoints
#[derive(Debug, Clone)]
pub struct ActionsClient {
    api: Arc<ApiClient>,
    base_path: String,
    poll: PollConfig,
}

impl ActionsClient {
    pub fn new(api: Arc<ApiClient>, poll: PollConfig) -> Self {
        Self { api, base_path: ROOT_ACTIONS_PATH.to_string(), poll }
    }

    /// Build the API client and the actions client from one configuration.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(ApiClient::new(config)?), config.poll.clone()))
    }

    /// Client for the actions of one resource, e.g. `scoped("/servers/42")`
    /// reads `/servers/42/actions`.
    pub fn scoped(&self, resource_path: &str) -> Self {
        let resource = resource_path.trim_end_matches('/');
        Self {
            api: Arc::clone(&self.api),
            base_path: format!("/{}/actions", resource.trim_start_matches('/')),
            poll: self.poll.clone(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Fetch one action.
    ///
    /// # Errors
    ///
    /// Returns [`NimbusError::Api`] with status 404 for unknown ids and
    /// transport or decode errors otherwise.
    #[instrument(skip(self), fields(base_path = %self.base_path))]
    pub async fn get_by_id(&self, id: u64) -> Result<Action> {
        let path = format!("{}/{}", self.base_path, id);
        let value = self.api.request(Method::GET, &path, &[], None).await?;
        let ActionEnvelope { action } = decode(value)?;
        check(&action);
        Ok(action)
    }

    /// Fetch one page of actions.
    ///
    /// # Errors
    ///
    /// Transport, API and decode errors.
    #[instrument(skip(self, params), fields(base_path = %self.base_path))]
    pub async fn get_list(&self, params: &ActionListParams) -> Result<ActionsPage> {
        let value = self.api.request(Method::GET, &self.base_path, &params.to_query(), None).await?;
        let page: ActionsPage = decode(value)?;
        page.actions.iter().for_each(check);
        debug!(count = page.actions.len(), next_page = ?page.next_page(), "fetched actions page");
        Ok(page)
    }

    /// Fetch every action matching `status` and `sort`, following
    /// pagination until the server reports no next page.
    ///
    /// # Errors
    ///
    /// The first page error aborts the walk.
    pub async fn get_all(&self, status: &[ActionStatus], sort: &[String]) -> Result<Vec<Action>> {
        let mut params = ActionListParams {
            status: status.to_vec(),
            sort: sort.to_vec(),
            page: Some(1),
            per_page: Some(ACTIONS_LIST_PER_PAGE),
        };

        let mut actions = Vec::new();
        loop {
            let page = self.get_list(&params).await?;
            let next = page.next_page();
            actions.extend(page.actions);

            match next {
                Some(next) if Some(next) != params.page => params.page = Some(next),
                _ => break,
            }
        }

        Ok(actions)
    }

    /// Fetch actions by id, at most [`ACTIONS_BY_ID_PAGE_SIZE`] ids per
    /// request, concatenating the chunk results in request order.
    ///
    /// Ids the server does not return are simply absent from the result.
    ///
    /// # Errors
    ///
    /// The first failing chunk aborts the lookup.
    #[instrument(skip(self, ids), fields(ids = ids.len(), base_path = %self.base_path))]
    pub async fn get_list_by_ids(&self, ids: &[u64]) -> Result<Vec<Action>> {
        let mut actions = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(ACTIONS_BY_ID_PAGE_SIZE) {
            let mut query: Vec<(String, String)> =
                chunk.iter().map(|id| ("id".to_string(), id.to_string())).collect();
            query.push(("per_page".to_string(), chunk.len().to_string()));

            let value = self.api.request(Method::GET, &self.base_path, &query, None).await?;
            let page: ActionsPage = decode(value)?;
            page.actions.iter().for_each(check);
            debug!(requested = chunk.len(), returned = page.actions.len(), "fetched actions chunk");
            actions.extend(page.actions);
        }

        Ok(actions)
    }

    fn waiter(&self) -> ActionWaiter {
        ActionWaiter::from_config(Arc::new(self.clone()), &self.poll)
    }

    /// Reload `action` until it finishes, using this client's poll settings.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_until_finished`].
    pub async fn wait_until_finished(
        &self,
        action: &Action,
        options: WaitOptions,
    ) -> std::result::Result<Action, ActionError> {
        self.waiter().wait_until_finished(action, options).await
    }

    /// Fail-fast wait for a group of actions.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_for`].
    pub async fn wait_for(
        &self,
        actions: Vec<Action>,
        timeout: Option<Duration>,
    ) -> std::result::Result<Vec<Action>, ActionError> {
        self.waiter().wait_for(actions, timeout).await
    }

    /// Collect-all wait for a group of actions.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_for_all`].
    pub async fn wait_for_all(
        &self,
        actions: Vec<Action>,
        timeout: Option<Duration>,
    ) -> std::result::Result<Vec<Action>, ActionError> {
        self.waiter().wait_for_all(actions, timeout).await
    }

    /// Group wait with a custom observer.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_for_function`].
    pub async fn wait_for_function<F>(
        &self,
        actions: Vec<Action>,
        observer: F,
        timeout: Option<Duration>,
    ) -> std::result::Result<Vec<Action>, ActionError>
    where
        F: FnMut(&Action) -> Observation + Send,
    {
        self.waiter().wait_for_function(actions, observer, timeout).await
    }
}

#[async_trait]
impl ActionSource for ActionsClient {
    async fn fetch_action(&self, id: u64) -> Result<Action> {
        self.get_by_id(id).await
    }

    async fn fetch_actions(&self, ids: &[u64]) -> Result<Vec<Action>> {
        self.get_list_by_ids(ids).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|err| NimbusError::from(InfraError::from(err)))
}

fn check(action: &Action) {
    if let Err(violation) = action.check_invariants() {
        warn!(action_id = action.id, %violation, "inconsistent action state from server");
    }
}
