//! File-backed token storage for persisting login state between runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use docapi_core::{AccessToken, RefreshToken, TokenStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    access_token: Option<AccessToken>,
    #[serde(default)]
    refresh_token: Option<RefreshToken>,
}

/// Default session file path under the platform data directory.
pub fn default_session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "docapi").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("session.json"))
}

/// A [`TokenStore`] that writes every change through to a JSON file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    session: RwLock<StoredSession>,
}

impl FileTokenStore {
    /// Open the session file, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let session = if path.exists() {
            let json = fs::read_to_string(&path).context("Failed to read session file")?;
            serde_json::from_str(&json).context("Invalid session file")?
        } else {
            StoredSession::default()
        };

        Ok(Self {
            path,
            session: RwLock::new(session),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The backend URL the stored tokens belong to.
    pub fn api_url(&self) -> Option<String> {
        self.read().api_url
    }

    /// Remember which backend the tokens belong to.
    pub fn set_api_url(&self, api_url: &str) -> Result<()> {
        self.update(|session| session.api_url = Some(api_url.to_string()))
            .context("Failed to save session file")
    }

    fn read(&self) -> StoredSession {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Apply `change` on disk first; memory only moves once the write succeeds.
    fn update(&self, change: impl FnOnce(&mut StoredSession)) -> docapi_core::Result<()> {
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        let mut next = session.clone();
        change(&mut next);
        persist(&self.path, &next).map_err(docapi_core::Error::storage)?;
        *session = next;
        Ok(())
    }
}

fn persist(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }

    let json = serde_json::to_string_pretty(session)?;
    fs::write(path, &json).context("Failed to write session file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn access_token(&self) -> Option<AccessToken> {
        self.read().access_token
    }

    async fn set_access_token(&self, token: Option<AccessToken>) -> docapi_core::Result<()> {
        self.update(|session| session.access_token = token)
    }

    async fn refresh_token(&self) -> Option<RefreshToken> {
        self.read().refresh_token
    }

    async fn set_refresh_token(&self, token: Option<RefreshToken>) -> docapi_core::Result<()> {
        self.update(|session| session.refresh_token = token)
    }
}
