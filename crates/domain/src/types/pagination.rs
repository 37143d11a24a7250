//! List and pagination types for action endpoints

use serde::{Deserialize, Serialize};

use super::action::{Action, ActionStatus};

/// Page cursor returned in `meta.pagination`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
    pub total_entries: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub pagination: Option<Pagination>,
}

/// One page of an action listing (`{"actions": [...], "meta": {...}}`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionsPage {
    pub actions: Vec<Action>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

impl ActionsPage {
    /// Next page number, if the server reported one.
    pub fn next_page(&self) -> Option<u32> {
        self.meta.as_ref().and_then(|m| m.pagination.as_ref()).and_then(|p| p.next_page)
    }
}

/// Filters for listing actions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionListParams {
    pub status: Vec<ActionStatus>,
    pub sort: Vec<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ActionListParams {
    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status.push(status);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort.push(sort.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Query pairs, repeating `status` and `sort` for each value.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        for status in &self.status {
            query.push(("status".to_string(), status.to_string()));
        }
        for sort in &self.sort {
            query.push(("sort".to_string(), sort.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page".to_string(), per_page.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_repeated_query_pairs() {
        let params = ActionListParams::default()
            .with_status(ActionStatus::Running)
            .with_status(ActionStatus::Error)
            .with_sort("id:desc")
            .page(2)
            .per_page(10);

        let query = params.to_query();
        assert_eq!(
            query,
            vec![
                ("status".to_string(), "running".to_string()),
                ("status".to_string(), "error".to_string()),
                ("sort".to_string(), "id:desc".to_string()),
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn empty_params_produce_no_query() {
        assert!(ActionListParams::default().to_query().is_empty());
    }

    #[test]
    fn reads_next_page_from_meta() {
        let page: ActionsPage = serde_json::from_value(json!({
            "actions": [],
            "meta": {"pagination": {
                "page": 1, "per_page": 25, "previous_page": null,
                "next_page": 2, "last_page": 3, "total_entries": 60
            }}
        }))
        .unwrap();

        assert_eq!(page.next_page(), Some(2));
    }

    #[test]
    fn missing_meta_means_no_next_page() {
        let page: ActionsPage = serde_json::from_value(json!({"actions": []})).unwrap();
        assert_eq!(page.next_page(), None);
    }
}
