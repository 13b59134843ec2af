use std::path::PathBuf;

use thiserror::Error;

use crate::{config, types::TokenState};

#[derive(Debug, Error)]
pub enum TokenCacheError {
    #[error("cannot access token cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("token cache is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed cache of the last token state.
///
/// The token is stored as pretty-printed JSON, by default in
/// `<data dir>/beatlist/cache/token.json`.
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: PathBuf) -> Self {
        TokenCache { path }
    }

    pub fn default_location() -> Self {
        Self::new(config::data_dir().join("cache/token.json"))
    }

    /// Reads the cached token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))` - A token was cached
    /// - `Ok(None)` - Nothing has been cached yet
    ///
    /// # Errors
    ///
    /// - [`TokenCacheError::Io`] when the file exists but cannot be read
    /// - [`TokenCacheError::Json`] when its content is not a token
    pub async fn load_token(&self) -> Result<Option<TokenState>, TokenCacheError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let content = async_fs::read_to_string(&self.path).await?;
        let token: TokenState = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    /// Replaces the cached token, creating the cache directory if needed.
    pub async fn save_token(&self, token: &TokenState) -> Result<(), TokenCacheError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Removes the cached token. A missing cache is not an error.
    pub async fn clear(&self) -> Result<(), TokenCacheError> {
        if self.path.is_file() {
            async_fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
