//! Conversation threads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-side conversation holding an ordered sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentThread {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Body of a create-thread request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CreateThreadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}
