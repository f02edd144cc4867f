//! Token credential trait and the wrappers shared by every token source.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use super::error::AuthError;
use super::store::TokenStore;
use super::token::AccessToken;

/// Tokens closer than this to expiry are refreshed.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Source of bearer tokens for the agents service.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short identifier used in logs and the token store.
    fn name(&self) -> &str;

    /// Acquire a token valid for `scopes`.
    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError>;
}

/// A token acquired out of band (e.g. `AZURE_ACCESS_TOKEN`).
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }

    pub fn from_jwt(raw: impl Into<String>) -> Self {
        Self {
            token: AccessToken::from_jwt(raw),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &str {
        "static-token"
    }

    async fn get_token(&self, _scopes: &[String]) -> Result<AccessToken, AuthError> {
        if self.token.expires_within(Duration::zero()) {
            return Err(AuthError::CredentialUnavailable(
                "static access token has expired".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

/// Caches tokens from an inner credential in memory and, optionally, on disk.
pub struct CachedCredential {
    inner: Arc<dyn TokenCredential>,
    store: Option<Arc<dyn TokenStore>>,
    cache: Mutex<HashMap<Vec<String>, AccessToken>>,
}

impl CachedCredential {
    pub fn new(inner: Arc<dyn TokenCredential>) -> Self {
        Self {
            inner,
            store: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_token_store(mut self, store: Option<Arc<dyn TokenStore>>) -> Self {
        self.store = store;
        self
    }

    fn read_cached(&self, scopes: &[String]) -> Option<AccessToken> {
        let margin = Duration::minutes(REFRESH_MARGIN_MINUTES);
        if let Some(token) = self.cache.lock().ok()?.get(scopes) {
            if !token.expires_within(margin) {
                return Some(token.clone());
            }
        }
        let store = self.store.as_ref()?;
        match store.load(self.inner.name(), scopes) {
            Ok(Some(token)) if !token.expires_within(margin) => {
                self.write_memory(scopes, &token);
                Some(token)
            }
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring unreadable token cache");
                None
            }
        }
    }

    fn write_memory(&self, scopes: &[String], token: &AccessToken) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(scopes.to_vec(), token.clone());
        }
    }
}

#[async_trait]
impl TokenCredential for CachedCredential {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.read_cached(scopes) {
            return Ok(token);
        }
        let token = self.inner.get_token(scopes).await?;
        self.write_memory(scopes, &token);
        if let Some(store) = &self.store {
            if let Err(err) = store.save(self.inner.name(), scopes, &token) {
                tracing::warn!(error = %err, "Failed to persist access token");
            }
        }
        Ok(token)
    }
}
