//! Thread messages.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::ListOptions;

/// Author of a thread message.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
    /// A role added by the service after this client was written.
    #[serde(other)]
    Other,
}

/// A message stored in a thread. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ThreadMessage {
    /// Concatenate all text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A single part of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: MessageText },
    ImageFile { image_file: ImageFile },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageText {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageFile {
    pub file_id: String,
}

/// Body of a create-message request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Query parameters for listing messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListMessagesOptions {
    pub list: ListOptions,
    /// Only messages produced by this run.
    pub run_id: Option<String>,
}

impl ListMessagesOptions {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = self.list.query();
        if let Some(run_id) = &self.run_id {
            query.push(("run_id", run_id.clone()));
        }
        query
    }
}
