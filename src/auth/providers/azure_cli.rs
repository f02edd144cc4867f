use std::path::PathBuf;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::auth::credential::TokenCredential;
use crate::auth::error::AuthError;
use crate::auth::token::AccessToken;

const CLI_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Reuses the login state of the Azure CLI (`az login`).
///
/// # Example
/// ```no_run
/// use foundry_agents::auth::providers::azure_cli::AzureCliCredential;
///
/// let credential = AzureCliCredential::new().with_tenant_id(Some("my-tenant".into()));
/// ```
pub struct AzureCliCredential {
    program: PathBuf,
    tenant_id: Option<String>,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("az"),
            tenant_id: None,
        }
    }

    /// Use a specific `az` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &str {
        "azure-cli"
    }

    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        let scope = scopes.first().ok_or_else(|| {
            AuthError::AuthenticationFailed("Azure CLI requires a scope".to_string())
        })?;
        let resource = scope.trim_end_matches("/.default");

        let mut command = tokio::process::Command::new(&self.program);
        command.args(["account", "get-access-token", "--output", "json", "--resource", resource]);
        if let Some(tenant) = &self.tenant_id {
            command.args(["--tenant", tenant]);
        }
        command.kill_on_drop(true);

        let output = match tokio::time::timeout(CLI_TIMEOUT, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::CredentialUnavailable(
                    "Azure CLI not found on PATH".to_string(),
                ));
            }
            Ok(Err(err)) => return Err(AuthError::Io(err.to_string())),
            Err(_) => {
                return Err(AuthError::AuthenticationFailed(format!(
                    "Azure CLI did not answer within {}s",
                    CLI_TIMEOUT.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("az login") || stderr.contains("az account set") {
                return Err(AuthError::CredentialUnavailable(
                    "Azure CLI is not logged in; run 'az login'".to_string(),
                ));
            }
            return Err(AuthError::AuthenticationFailed(format!(
                "Azure CLI failed: {}",
                stderr.trim()
            )));
        }

        parse_cli_token(&output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct CliToken {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "expiresOn")]
    expires_on_local: Option<String>,
    expires_on: Option<i64>,
}

fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken, AuthError> {
    let payload: CliToken = serde_json::from_slice(stdout)?;

    // Newer CLIs report a unix timestamp; older ones only a local-time string.
    let expires_at = match (payload.expires_on, payload.expires_on_local.as_deref()) {
        (Some(secs), _) => Utc.timestamp_opt(secs, 0).single(),
        (None, Some(local)) => NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|naive| chrono::Local.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc)),
        (None, None) => None,
    }
    .ok_or_else(|| AuthError::InvalidResponse("Azure CLI token has no expiry".to_string()))?;

    Ok(AccessToken::new(payload.access_token, expires_at))
}
