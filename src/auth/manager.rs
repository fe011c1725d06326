use reqwest::Client;
use std::sync::Arc;

use super::cache::TokenCache;
use super::login::Authenticator;
use crate::config::Config;
use crate::error::Result;

/// Session manager
/// Cache-first token retrieval with transparent re-login and invalidation
pub struct SessionManager {
    config: Arc<Config>,
    cache: TokenCache,
    authenticator: Authenticator,
}

impl SessionManager {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        let cache = TokenCache::new(config.cache_dir.clone());
        Self {
            config,
            cache,
            authenticator: Authenticator::new(client),
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Get a fresh access token.
    /// `None` means the endpoint needs no authentication and the
    /// Authorization header must be omitted.
    pub async fn get_token(&self) -> Result<Option<String>> {
        if !self.config.has_credentials() {
            tracing::debug!("No credentials configured, skipping authentication");
            return Ok(None);
        }

        let identity = self.config.identity();

        match self.cache.load(&identity) {
            Ok(Some(token)) if token.is_fresh() && token.is_owned_by(&self.config.username) => {
                tracing::info!("Using cached access token");
                return Ok(Some(token.access_token));
            }
            Ok(Some(_)) => tracing::debug!("Cached token is stale or belongs to another user"),
            Ok(None) => tracing::debug!("No cached token"),
            Err(e) => tracing::warn!("Failed to read token cache: {}", e),
        }

        let token = self
            .authenticator
            .login(&self.config.addr, &self.config.username, &self.config.password)
            .await?;

        if let Err(e) = self.cache.save(&identity, &token) {
            tracing::warn!("Failed to save token cache: {}", e);
        }

        Ok(Some(token.access_token))
    }

    /// Drop the cached token for this endpoint identity.
    /// Called once per authorization rejection. Anonymous sessions never
    /// cache a token, so there is nothing to drop for them.
    pub fn invalidate(&self) -> Result<()> {
        let identity = self.config.identity();
        if identity.username.is_none() {
            return Ok(());
        }
        self.cache.clear(&identity)
    }
}
