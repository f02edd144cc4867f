//! Project client and the agents operations it exposes.

pub mod agents;
pub mod api;
pub mod http;

pub use agents::{AgentsClient, RunWaitOptions};
pub use api::AgentsApi;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::auth::{DefaultAzureCredential, FileTokenStore, TokenCredential, TokenStore};
use crate::config::ProjectConfig;
use crate::error::FoundryError;

pub(crate) struct ClientInner {
    pub(crate) config: ProjectConfig,
    pub(crate) endpoint: String,
    pub(crate) credential: Arc<dyn TokenCredential>,
    pub(crate) http: reqwest::Client,
    closed: AtomicBool,
}

impl ClientInner {
    pub(crate) fn ensure_open(&self) -> Result<(), FoundryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FoundryError::InvalidState("client is closed".into()));
        }
        Ok(())
    }
}

/// Handle bound to one project endpoint and credential.
///
/// Cloning is cheap and clones share the closed flag.
///
/// # Example
/// ```no_run
/// use foundry_agents::client::ProjectClient;
///
/// # async fn demo() -> foundry_agents::error::Result<()> {
/// let client = ProjectClient::from_env()?;
/// let agents = client
///     .scoped(|client| async move { client.agents().list_agents(&Default::default()).await })
///     .await?;
/// println!("{} agents", agents.data.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProjectClient {
    inner: Arc<ClientInner>,
}

impl ProjectClient {
    /// Build a client. No request is sent and no token is acquired yet.
    pub fn new(config: ProjectConfig, credential: Arc<dyn TokenCredential>) -> Result<Self, FoundryError> {
        let http = http::build_client(config.request_timeout)?;
        let endpoint = config.endpoint();
        tracing::debug!(%endpoint, api_version = %config.api_version, "Project client created");
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                endpoint,
                credential,
                http,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Configuration from the environment, default credential chain with the
    /// on-disk token cache.
    ///
    /// Fails with `Configuration` before anything touches the network when
    /// the connection string is missing or malformed.
    pub fn from_env() -> Result<Self, FoundryError> {
        let config = ProjectConfig::from_env()?;
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new_default());
        let credential = DefaultAzureCredential::from_env().with_token_store(Some(store));
        Self::new(config, Arc::new(credential))
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.inner.config
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn agents(&self) -> AgentsClient {
        AgentsClient::new(Arc::clone(&self.inner))
    }

    /// Mark the client closed. Later operations fail with `InvalidState`.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(endpoint = %self.inner.endpoint, "Project client closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Run `f` with this client and close it afterwards, whether `f`
    /// returns, fails or panics.
    pub async fn scoped<F, Fut, T>(self, f: F) -> Result<T, FoundryError>
    where
        F: FnOnce(ProjectClient) -> Fut,
        Fut: Future<Output = Result<T, FoundryError>>,
    {
        let _guard = CloseGuard(self.clone());
        f(self).await
    }
}

impl std::fmt::Debug for ProjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectClient")
            .field("endpoint", &self.inner.endpoint)
            .field("credential", &self.inner.credential.name())
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct CloseGuard(ProjectClient);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}
