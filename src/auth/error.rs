use thiserror::Error;

use crate::error::FoundryError;

/// Normalized credential errors across token sources.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The source is not configured here; a chain moves on to the next one.
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("No credential in the chain produced a token: {}", .attempts.join("; "))]
    ChainExhausted { attempts: Vec<String> },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::CredentialUnavailable(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<AuthError> for FoundryError {
    fn from(error: AuthError) -> Self {
        FoundryError::Authentication(error.to_string())
    }
}
