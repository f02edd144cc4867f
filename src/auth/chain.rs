//! Ambient credential resolution (`DefaultAzureCredential`).

use std::sync::Arc;

use async_trait::async_trait;

use super::credential::{CachedCredential, StaticTokenCredential, TokenCredential};
use super::error::AuthError;
use super::providers::azure_cli::AzureCliCredential;
use super::providers::environment::ClientSecretCredential;
use super::providers::managed_identity::{IdentityEndpoint, ManagedIdentityCredential, IMDS_ENDPOINT};
use super::store::TokenStore;
use super::token::AccessToken;

/// Inputs for the default credential chain, normally read from the environment.
#[derive(Debug, Clone, Default)]
pub struct CredentialOptions {
    pub access_token: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub authority_host: Option<String>,
    pub identity_endpoint: Option<String>,
    pub identity_header: Option<String>,
    pub imds_endpoint: Option<String>,
    pub exclude_managed_identity: bool,
    pub exclude_azure_cli: bool,
    pub azure_cli_program: Option<String>,
}

impl CredentialOptions {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            access_token: get("AZURE_ACCESS_TOKEN"),
            tenant_id: get("AZURE_TENANT_ID"),
            client_id: get("AZURE_CLIENT_ID"),
            client_secret: get("AZURE_CLIENT_SECRET"),
            authority_host: get("AZURE_AUTHORITY_HOST"),
            identity_endpoint: get("IDENTITY_ENDPOINT"),
            identity_header: get("IDENTITY_HEADER"),
            imds_endpoint: get("AZURE_POD_IDENTITY_AUTHORITY_HOST")
                .map(|host| format!("{}/metadata/identity/oauth2/token", host.trim_end_matches('/'))),
            exclude_managed_identity: false,
            exclude_azure_cli: false,
            azure_cli_program: None,
        }
    }
}

/// Tries each token source in order and returns the first token.
///
/// Sources that are simply not configured are skipped; any other failure
/// stops the chain.
pub struct ChainedTokenCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
}

impl ChainedTokenCredential {
    pub fn new(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl TokenCredential for ChainedTokenCredential {
    fn name(&self) -> &str {
        "chained"
    }

    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        let mut attempts = Vec::new();
        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => {
                    tracing::debug!(source = source.name(), "Acquired access token");
                    return Ok(token);
                }
                Err(err) if err.is_unavailable() => {
                    tracing::debug!(source = source.name(), error = %err, "Credential source unavailable");
                    attempts.push(format!("{}: {err}", source.name()));
                }
                Err(err) => {
                    tracing::warn!(source = source.name(), error = %err, "Credential source failed");
                    attempts.push(format!("{}: {err}", source.name()));
                    return Err(AuthError::ChainExhausted { attempts });
                }
            }
        }
        Err(AuthError::ChainExhausted { attempts })
    }
}

/// Environment → managed identity → Azure CLI, with token caching.
///
/// # Example
/// ```no_run
/// use foundry_agents::auth::DefaultAzureCredential;
///
/// let credential = DefaultAzureCredential::from_env();
/// ```
pub struct DefaultAzureCredential {
    inner: CachedCredential,
}

impl DefaultAzureCredential {
    pub fn from_env() -> Self {
        Self::new(CredentialOptions::from_env())
    }

    pub fn new(options: CredentialOptions) -> Self {
        let chain: Arc<dyn TokenCredential> = Arc::new(build_chain(&options));
        Self {
            inner: CachedCredential::new(chain),
        }
    }

    /// Persist acquired tokens between processes.
    pub fn with_token_store(mut self, store: Option<Arc<dyn TokenStore>>) -> Self {
        self.inner = self.inner.with_token_store(store);
        self
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    fn name(&self) -> &str {
        "default-azure-credential"
    }

    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        self.inner.get_token(scopes).await
    }
}

pub(crate) fn build_chain(options: &CredentialOptions) -> ChainedTokenCredential {
    let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();

    if let Some(raw) = &options.access_token {
        sources.push(Arc::new(StaticTokenCredential::from_jwt(raw.clone())));
    }

    match (&options.tenant_id, &options.client_id, &options.client_secret) {
        (Some(tenant), Some(client), Some(secret)) => {
            let mut credential = ClientSecretCredential::new(tenant, client, secret);
            if let Some(host) = &options.authority_host {
                credential = credential.with_authority_host(host);
            }
            sources.push(Arc::new(credential));
        }
        _ => sources.push(Arc::new(Unavailable {
            name: "environment",
            reason: "AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET are not all set",
        })),
    }

    if !options.exclude_managed_identity {
        let endpoint = match (&options.identity_endpoint, &options.identity_header) {
            (Some(url), Some(header)) => IdentityEndpoint::AppService {
                url: url.clone(),
                header: header.clone(),
            },
            _ => IdentityEndpoint::Imds {
                url: options
                    .imds_endpoint
                    .clone()
                    .unwrap_or_else(|| IMDS_ENDPOINT.to_string()),
            },
        };
        // A bare AZURE_CLIENT_ID (no secret) selects a user-assigned identity.
        let client_id = options
            .client_id
            .clone()
            .filter(|_| options.client_secret.is_none());
        sources.push(Arc::new(
            ManagedIdentityCredential::new(endpoint).with_client_id(client_id),
        ));
    }

    if !options.exclude_azure_cli {
        let mut credential = AzureCliCredential::new().with_tenant_id(options.tenant_id.clone());
        if let Some(program) = &options.azure_cli_program {
            credential = credential.with_program(program);
        }
        sources.push(Arc::new(credential));
    }

    ChainedTokenCredential::new(sources)
}

struct Unavailable {
    name: &'static str,
    reason: &'static str,
}

#[async_trait]
impl TokenCredential for Unavailable {
    fn name(&self) -> &str {
        self.name
    }

    async fn get_token(&self, _scopes: &[String]) -> Result<AccessToken, AuthError> {
        Err(AuthError::CredentialUnavailable(self.reason.to_string()))
    }
}
