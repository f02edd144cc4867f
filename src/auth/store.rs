use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::AuthError;
use super::token::AccessToken;

/// Storage abstraction for cached access tokens.
pub trait TokenStore: Send + Sync {
    fn load(&self, source: &str, scopes: &[String]) -> Result<Option<AccessToken>, AuthError>;
    fn save(&self, source: &str, scopes: &[String], token: &AccessToken) -> Result<(), AuthError>;
    fn clear(&self, source: &str, scopes: &[String]) -> Result<(), AuthError>;
    /// Remove every cached token; returns how many were removed.
    fn clear_all(&self) -> Result<usize, AuthError>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_store_dir()
    }
}

/// File-backed token store, one TOML file per credential source and scope set.
///
/// # Example
/// ```no_run
/// use foundry_agents::auth::{AccessToken, FileTokenStore, TokenStore};
/// use chrono::{Duration, Utc};
///
/// let store = FileTokenStore::new_default();
/// let scopes = vec!["https://management.azure.com/.default".to_string()];
/// let token = AccessToken::new("access", Utc::now() + Duration::hours(1));
/// store.save("azure-cli", &scopes, &token)?;
/// # Ok::<(), foundry_agents::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_store_dir(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn token_path(&self, source: &str, scopes: &[String]) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}.toml", normalize_label(source), scope_key(scopes)))
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, source: &str, scopes: &[String]) -> Result<Option<AccessToken>, AuthError> {
        let path = self.token_path(source, scopes);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        Ok(Some(file.token))
    }

    fn save(&self, source: &str, scopes: &[String], token: &AccessToken) -> Result<(), AuthError> {
        let path = self.token_path(source, scopes);
        Self::ensure_parent(&path)?;
        let file = TokenFile {
            version: 1,
            source: source.to_string(),
            scopes: scopes.to_vec(),
            token: token.clone(),
            saved_at: Utc::now(),
        };
        fs::write(&path, toml::to_string(&file)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, source: &str, scopes: &[String]) -> Result<(), AuthError> {
        let path = self.token_path(source, scopes);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }

    fn clear_all(&self) -> Result<usize, AuthError> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    source: String,
    scopes: Vec<String>,
    token: AccessToken,
    saved_at: DateTime<Utc>,
}

fn default_store_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".foundry-agents"))
        .unwrap_or_else(|| PathBuf::from(".foundry-agents"))
}

/// Short, filesystem-safe digest of a scope list (order-insensitive).
fn scope_key(scopes: &[String]) -> String {
    let mut sorted: Vec<&str> = scopes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let digest = Sha256::digest(sorted.join(" ").as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
