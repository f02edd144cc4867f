use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;

use crate::auth::credential::TokenCredential;
use crate::auth::error::AuthError;
use crate::auth::token::AccessToken;

pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const PROBE_TIMEOUT: StdDuration = StdDuration::from_secs(1);

/// Where the managed identity token is served from.
#[derive(Debug, Clone)]
pub enum IdentityEndpoint {
    /// Azure VM instance metadata service.
    Imds { url: String },
    /// App Service / Functions (`IDENTITY_ENDPOINT` + `IDENTITY_HEADER`).
    AppService { url: String, header: String },
}

/// Managed identity credential for workloads hosted in Azure.
pub struct ManagedIdentityCredential {
    client: reqwest::Client,
    endpoint: IdentityEndpoint,
    client_id: Option<String>,
}

impl ManagedIdentityCredential {
    pub fn new(endpoint: IdentityEndpoint) -> Self {
        // The metadata address is link-local; a proxy must never answer for it.
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .no_proxy()
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            client_id: None,
        }
    }

    /// Select a user-assigned identity.
    pub fn with_client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &str {
        "managed-identity"
    }

    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        let scope = scopes.first().ok_or_else(|| {
            AuthError::AuthenticationFailed("managed identity requires a scope".to_string())
        })?;
        let resource = scope.trim_end_matches("/.default").to_string();

        let mut query = vec![("resource", resource)];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.clone()));
        }

        let request = match &self.endpoint {
            IdentityEndpoint::Imds { url } => {
                query.push(("api-version", IMDS_API_VERSION.to_string()));
                self.client.get(url).header("Metadata", "true")
            }
            IdentityEndpoint::AppService { url, header } => {
                query.push(("api-version", APP_SERVICE_API_VERSION.to_string()));
                self.client.get(url).header("X-IDENTITY-HEADER", header)
            }
        };

        // An unreachable endpoint means we are not running on Azure compute.
        let resp = request.query(&query).send().await.map_err(|err| {
            AuthError::CredentialUnavailable(format!("managed identity endpoint unreachable: {err}"))
        })?;

        let status = resp.status();
        let is_imds = matches!(self.endpoint, IdentityEndpoint::Imds { .. });
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // Hosts outside Azure may answer at the IMDS address.
            if is_imds {
                return Err(AuthError::CredentialUnavailable(format!(
                    "managed identity endpoint answered with status {status}"
                )));
            }
            return Err(AuthError::AuthenticationFailed(format!(
                "managed identity request failed with status {status}: {body}"
            )));
        }

        let payload: ManagedIdentityToken = match resp.json().await {
            Ok(payload) => payload,
            Err(err) if is_imds => {
                return Err(AuthError::CredentialUnavailable(format!(
                    "managed identity endpoint returned an unexpected body: {err}"
                )));
            }
            Err(err) => return Err(err.into()),
        };
        let expires_on = parse_expires_on(&payload.expires_on)?;
        Ok(AccessToken::new(payload.access_token, expires_on))
    }
}

#[derive(Debug, Deserialize)]
struct ManagedIdentityToken {
    access_token: String,
    expires_on: serde_json::Value,
}

fn parse_expires_on(value: &serde_json::Value) -> Result<chrono::DateTime<Utc>, AuthError> {
    let secs = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AuthError::InvalidResponse(format!("invalid expires_on: {value}")))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AuthError::InvalidResponse(format!("expires_on out of range: {secs}")))
}
