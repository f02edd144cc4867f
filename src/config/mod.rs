//! Project configuration (explicit values > environment > `.env` file).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::FoundryError;
use crate::util::retry::RetryPolicy;

/// Environment variable holding the project connection string.
pub const CONNECTION_STRING_ENV: &str = "PROJECT_CONNECTION_STRING";
/// Optional full base URL that replaces the endpoint derived from the connection string.
pub const ENDPOINT_OVERRIDE_ENV: &str = "PROJECT_ENDPOINT_OVERRIDE";
pub const API_VERSION_ENV: &str = "AGENTS_API_VERSION";
pub const POLL_INTERVAL_ENV: &str = "AGENTS_POLL_INTERVAL_MS";
pub const RUN_TIMEOUT_ENV: &str = "AGENTS_RUN_TIMEOUT_SECS";

pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
pub const DEFAULT_SCOPE: &str = "https://management.azure.com/.default";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Parsed `<HostName>;<SubscriptionId>;<ResourceGroup>;<HubName>` connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host_name: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ConnectionString {
    /// Base URL of the agents data plane for this project.
    pub fn agents_endpoint(&self) -> String {
        let host = self
            .host_name
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!(
            "https://{host}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            self.subscription_id, self.resource_group, self.project_name
        )
    }
}

impl FromStr for ConnectionString {
    type Err = FoundryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.trim().split(';').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(FoundryError::Configuration(format!(
                "Invalid connection string: expected 4 ';'-separated parts \
                 (<HostName>;<SubscriptionId>;<ResourceGroup>;<HubName>), got {}",
                parts.len()
            )));
        }
        if let Some(index) = parts.iter().position(|p| p.is_empty()) {
            let label = ["HostName", "SubscriptionId", "ResourceGroup", "HubName"][index];
            return Err(FoundryError::Configuration(format!(
                "Invalid connection string: {label} is empty"
            )));
        }
        Ok(Self {
            host_name: parts[0].to_string(),
            subscription_id: parts[1].to_string(),
            resource_group: parts[2].to_string(),
            project_name: parts[3].to_string(),
        })
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            self.host_name, self.subscription_id, self.resource_group, self.project_name
        )
    }
}

/// Connection settings for a [`ProjectClient`](crate::client::ProjectClient).
///
/// Built explicitly (tests, embedding applications) or from the process
/// environment via [`ProjectConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub connection: ConnectionString,
    pub endpoint_override: Option<String>,
    pub api_version: String,
    pub scopes: Vec<String>,
    pub poll_interval: Duration,
    /// Upper bound for run-and-wait; `None` waits until the run is terminal.
    pub run_timeout: Option<Duration>,
    pub request_timeout: Duration,
    pub retry_policy: RetryPolicy,
}

impl ProjectConfig {
    pub fn new(connection: ConnectionString) -> Self {
        Self {
            connection,
            endpoint_override: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
            poll_interval: DEFAULT_POLL_INTERVAL,
            run_timeout: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Parse a connection string and build the default config around it.
    pub fn from_connection_string(raw: &str) -> Result<Self, FoundryError> {
        Ok(Self::new(raw.parse()?))
    }

    /// Load from environment variables (`.env` is honoured when present).
    pub fn from_env() -> Result<Self, FoundryError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FoundryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(CONNECTION_STRING_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                FoundryError::Configuration(format!(
                    "{CONNECTION_STRING_ENV} is not set; expected \
                     <HostName>;<SubscriptionId>;<ResourceGroup>;<HubName>"
                ))
            })?;
        let mut config = Self::from_connection_string(&raw)?;

        if let Some(endpoint) = lookup(ENDPOINT_OVERRIDE_ENV).filter(|v| !v.trim().is_empty()) {
            config.endpoint_override = Some(endpoint.trim().to_string());
        }
        if let Some(version) = lookup(API_VERSION_ENV).filter(|v| !v.trim().is_empty()) {
            config.api_version = version.trim().to_string();
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                FoundryError::Configuration(format!("{POLL_INTERVAL_ENV} must be an integer, got '{raw}'"))
            })?;
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(RUN_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                FoundryError::Configuration(format!("{RUN_TIMEOUT_ENV} must be an integer, got '{raw}'"))
            })?;
            config.run_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_endpoint_override(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Base URL all agent operations are issued against.
    pub fn endpoint(&self) -> String {
        match &self.endpoint_override {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => self.connection.agents_endpoint(),
        }
    }
}
