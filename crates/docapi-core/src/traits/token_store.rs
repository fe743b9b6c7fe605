//! Token storage capability.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::{AccessToken, RefreshToken, Result};

/// Storage for the access/refresh credential pair.
///
/// The client reads and writes its tokens only through this trait, so a host
/// application can keep them in memory, a keychain, or an encrypted file.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn access_token(&self) -> Option<AccessToken>;

    async fn set_access_token(&self, token: Option<AccessToken>) -> Result<()>;

    async fn refresh_token(&self) -> Option<RefreshToken>;

    async fn set_refresh_token(&self, token: Option<RefreshToken>) -> Result<()>;
}

/// In-process token storage. The default for new clients.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

#[derive(Debug, Default)]
struct StoredTokens {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a known credential pair, e.g. restored from a previous run.
    pub fn with_tokens(access_token: Option<AccessToken>, refresh_token: Option<RefreshToken>) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access_token,
                refresh_token,
            }),
        }
    }
}

// A poisoned lock still holds a consistent pair of Options.
#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Option<AccessToken> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.access_token.clone()
    }

    async fn set_access_token(&self, token: Option<AccessToken>) -> Result<()> {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.access_token = token;
        Ok(())
    }

    async fn refresh_token(&self) -> Option<RefreshToken> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.refresh_token.clone()
    }

    async fn set_refresh_token(&self, token: Option<RefreshToken>) -> Result<()> {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.refresh_token = token;
        Ok(())
    }
}
