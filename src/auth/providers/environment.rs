use chrono::{Duration, Utc};
use serde::Deserialize;

use async_trait::async_trait;

use crate::auth::credential::TokenCredential;
use crate::auth::error::AuthError;
use crate::auth::token::AccessToken;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Service-principal credential using the OAuth2 client-credentials grant.
///
/// Configured from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`
/// and optionally `AZURE_AUTHORITY_HOST`.
///
/// # Example
/// ```no_run
/// use foundry_agents::auth::providers::environment::ClientSecretCredential;
///
/// let credential = ClientSecretCredential::new("tenant", "client", "secret");
/// ```
pub struct ClientSecretCredential {
    client: reqwest::Client,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
        }
    }

    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into();
        self
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    fn name(&self) -> &str {
        "environment"
    }

    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        let scope = scopes.join(" ");
        let resp = self
            .client
            .post(self.token_url())
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: TokenErrorResponse = resp.json().await.unwrap_or_default();
            return Err(AuthError::AuthenticationFailed(format!(
                "token request failed with status {status}: {}",
                body.error_description
                    .or(body.error)
                    .unwrap_or_else(|| "no error description".to_string())
            )));
        }

        let payload: TokenResponse = resp.json().await?;
        let expires_at = Duration::try_seconds(payload.expires_in)
            .filter(|lifetime| *lifetime > Duration::zero())
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::InvalidResponse(format!("expires_in out of range: {}", payload.expires_in))
            })?;
        Ok(AccessToken::new(payload.access_token, expires_at))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}
