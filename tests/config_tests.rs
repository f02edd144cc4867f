//! Tests for loading project configuration from the process environment.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use foundry_agents::auth::CredentialOptions;
use foundry_agents::client::ProjectClient;
use foundry_agents::config::{ProjectConfig, DEFAULT_API_VERSION};
use foundry_agents::error::FoundryError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 10] = [
    "PROJECT_CONNECTION_STRING",
    "PROJECT_ENDPOINT_OVERRIDE",
    "AGENTS_API_VERSION",
    "AGENTS_POLL_INTERVAL_MS",
    "AGENTS_RUN_TIMEOUT_SECS",
    "AZURE_ACCESS_TOKEN",
    "AZURE_TENANT_ID",
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
    "AZURE_AUTHORITY_HOST",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn from_env_reads_connection_string_and_overrides() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var(
        "PROJECT_CONNECTION_STRING",
        " westeurope.api.azureml.ms;sub-1;rg-agents;hub-1 ",
    );
    std::env::set_var("AGENTS_POLL_INTERVAL_MS", "250");
    std::env::set_var("AGENTS_RUN_TIMEOUT_SECS", "90");

    let config = ProjectConfig::from_env().unwrap();
    assert_eq!(config.connection.host_name, "westeurope.api.azureml.ms");
    assert_eq!(config.api_version, DEFAULT_API_VERSION);
    assert_eq!(config.poll_interval, Duration::from_millis(250));
    assert_eq!(config.run_timeout, Some(Duration::from_secs(90)));
    assert_eq!(
        config.endpoint(),
        "https://westeurope.api.azureml.ms/agents/v1.0/subscriptions/sub-1/resourceGroups/rg-agents/providers/Microsoft.MachineLearningServices/workspaces/hub-1"
    );

    std::env::set_var("PROJECT_ENDPOINT_OVERRIDE", "http://127.0.0.1:9999/");
    std::env::set_var("AGENTS_API_VERSION", "2025-01-01");
    let config = ProjectConfig::from_env().unwrap();
    assert_eq!(config.endpoint(), "http://127.0.0.1:9999");
    assert_eq!(config.api_version, "2025-01-01");
}

#[test]
fn from_env_without_connection_string_is_configuration_error() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    let err = ProjectConfig::from_env().unwrap_err();
    assert!(matches!(err, FoundryError::Configuration(_)));
}

#[test]
fn project_client_from_env_fails_before_acquiring_a_token() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();
    std::env::set_var("PROJECT_CONNECTION_STRING", "host-only;sub");

    let err = ProjectClient::from_env().unwrap_err();
    match err {
        FoundryError::Configuration(message) => assert!(message.contains("got 2")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn credential_options_ignore_blank_values() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();
    std::env::set_var("AZURE_TENANT_ID", "tenant-1");
    std::env::set_var("AZURE_CLIENT_ID", "  ");

    let options = CredentialOptions::from_env();
    assert_eq!(options.tenant_id.as_deref(), Some("tenant-1"));
    assert_eq!(options.client_id, None);
    assert_eq!(options.client_secret, None);
}
