//! Port interfaces for action lookups

use async_trait::async_trait;
use nimbus_domain::{Action, Result};

/// Source of fresh action state, implemented by the actions resource client
#[async_trait]
pub trait ActionSource: Send + Sync {
    /// Fetch the current state of one action
    async fn fetch_action(&self, id: u64) -> Result<Action>;

    /// Fetch the current state of several actions.
    ///
    /// Implementations batch the lookup as the API requires and should
    /// return exactly one action per requested id, in any order.
    async fn fetch_actions(&self, ids: &[u64]) -> Result<Vec<Action>>;
}
