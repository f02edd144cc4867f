//! CLI auth command handlers.

use std::sync::Arc;

use crate::auth::{DefaultAzureCredential, FileTokenStore, TokenCredential, TokenStore};
use crate::config::{ProjectConfig, DEFAULT_SCOPE};

/// Handle `foundry-agents auth token`.
pub async fn handle_token(show: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Scopes come from the project config when one is available.
    let scopes = ProjectConfig::from_env()
        .map(|config| config.scopes)
        .unwrap_or_else(|_| vec![DEFAULT_SCOPE.to_string()]);

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new_default());
    let credential = DefaultAzureCredential::from_env().with_token_store(Some(store));
    let token = credential.get_token(&scopes).await?;

    println!("Token acquired for {}", scopes.join(" "));
    println!("  expires: {}", token.expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if show {
        println!("{}", token.token);
    }
    Ok(())
}

/// Handle `foundry-agents auth logout`.
pub fn handle_logout() -> Result<(), Box<dyn std::error::Error>> {
    let store = FileTokenStore::new_default();
    let removed = store.clear_all()?;
    println!(
        "Removed {removed} cached token(s) from {}",
        store.base_dir().display()
    );
    Ok(())
}
