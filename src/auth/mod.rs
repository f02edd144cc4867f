//! Credential resolution and token caching for the agents service.

pub mod chain;
pub mod credential;
pub mod error;
pub mod providers;
pub mod store;
pub mod token;

pub use chain::{ChainedTokenCredential, CredentialOptions, DefaultAzureCredential};
pub use credential::{CachedCredential, StaticTokenCredential, TokenCredential};
pub use error::AuthError;
pub use store::{FileTokenStore, TokenStore, TokenStoreConfig};
pub use token::AccessToken;
