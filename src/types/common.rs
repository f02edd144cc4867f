//! Shapes shared by several resources: list pages, deletion results, ordering.

use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub object: String,
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Result of deleting an agent or thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionStatus {
    pub id: String,
    pub deleted: bool,
    #[serde(default)]
    pub object: String,
}

/// Sort order for list operations, by creation time.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters for list operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Page size (the service accepts 1..=100).
    pub limit: Option<u32>,
    pub order: Option<ListOrder>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl ListOptions {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(order) = self.order {
            query.push(("order", order.to_string()));
        }
        if let Some(after) = &self.after {
            query.push(("after", after.clone()));
        }
        if let Some(before) = &self.before {
            query.push(("before", before.clone()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_contains_only_set_fields() {
        let options = ListOptions {
            limit: Some(20),
            order: Some(ListOrder::Asc),
            after: Some("msg_1".into()),
            before: None,
        };
        assert_eq!(
            options.query(),
            vec![
                ("limit", "20".to_string()),
                ("order", "asc".to_string()),
                ("after", "msg_1".to_string()),
            ]
        );
        assert!(ListOptions::default().query().is_empty());
    }

    #[test]
    fn page_defaults_missing_cursor_fields() {
        let page: ListResponse<DeletionStatus> =
            serde_json::from_str(r#"{"data":[{"id":"a","deleted":true}]}"#).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_more);
        assert!(page.last_id.is_none());
    }
}
