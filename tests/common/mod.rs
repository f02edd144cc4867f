//! Shared helpers: a wiremock-backed project client and canned service payloads.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use wiremock::MockServer;

use foundry_agents::auth::{AccessToken, StaticTokenCredential};
use foundry_agents::client::ProjectClient;
use foundry_agents::config::ProjectConfig;
use foundry_agents::util::retry::RetryPolicy;

pub const CONNECTION_STRING: &str = "eastus.api.azureml.ms;sub-1;rg-1;hub-1";
pub const TOKEN: &str = "test-token";

pub fn config_for(server: &MockServer) -> ProjectConfig {
    ProjectConfig::from_connection_string(CONNECTION_STRING)
        .expect("connection string")
        .with_endpoint_override(server.uri())
        .with_poll_interval(Duration::from_millis(10))
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
            multiplier: 2.0,
        })
}

pub fn client_with(config: ProjectConfig) -> ProjectClient {
    let credential = StaticTokenCredential::new(AccessToken::new(
        TOKEN,
        Utc::now() + chrono::Duration::hours(1),
    ));
    ProjectClient::new(config, Arc::new(credential)).expect("client")
}

pub fn client_for(server: &MockServer) -> ProjectClient {
    client_with(config_for(server))
}

pub fn agent_json(id: &str) -> Value {
    json!({
        "id": id,
        "object": "assistant",
        "created_at": 1_700_000_000,
        "name": "my-assistant",
        "description": null,
        "model": "gpt-4o-mini",
        "instructions": "You are a helpful assistant",
        "tools": [{"type": "code_interpreter"}],
        "metadata": {}
    })
}

pub fn thread_json(id: &str) -> Value {
    json!({
        "id": id,
        "object": "thread",
        "created_at": 1_700_000_000,
        "metadata": {}
    })
}

pub fn message_json(id: &str, thread_id: &str, role: &str, text: &str) -> Value {
    json!({
        "id": id,
        "object": "thread.message",
        "created_at": 1_700_000_000,
        "thread_id": thread_id,
        "role": role,
        "content": [{"type": "text", "text": {"value": text, "annotations": []}}],
        "assistant_id": null,
        "run_id": null,
        "metadata": {}
    })
}

pub fn run_json(id: &str, thread_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "object": "thread.run",
        "thread_id": thread_id,
        "assistant_id": "asst_1",
        "status": status,
        "model": "gpt-4o-mini",
        "instructions": "You are a helpful assistant",
        "tools": [],
        "created_at": 1_700_000_000,
        "metadata": {}
    })
}

pub fn requires_action_json(id: &str, thread_id: &str, calls: &[(&str, &str, &str)]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(call_id, name, arguments)| {
            json!({
                "id": call_id,
                "type": "function",
                "function": {"name": name, "arguments": arguments}
            })
        })
        .collect();
    let mut run = run_json(id, thread_id, "requires_action");
    run["required_action"] = json!({
        "type": "submit_tool_outputs",
        "submit_tool_outputs": {"tool_calls": tool_calls}
    });
    run
}

pub fn not_found_json(message: &str) -> Value {
    json!({"error": {"code": "not_found", "message": message}})
}
