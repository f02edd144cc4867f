//! Agents (the service calls them assistants).

use std::collections::HashMap;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::{ToolDefinition, ToolSet};

/// A server-side agent: model, instructions and attached tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Body of a create-agent request.
///
/// # Example
/// ```
/// use foundry_agents::types::CreateAgentOptions;
///
/// let options = CreateAgentOptions::builder()
///     .model("gpt-4o-mini")
///     .name("my-assistant")
///     .instructions("You are a helpful assistant")
///     .build();
/// assert!(options.tools.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Builder)]
pub struct CreateAgentOptions {
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[builder(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateAgentOptions {
    /// Attach every definition and resource of `toolset`, replacing any
    /// tools set earlier.
    pub fn with_toolset(mut self, toolset: &ToolSet) -> Self {
        self.tools = toolset.definitions();
        self.tool_resources = toolset.resources();
        self
    }
}
