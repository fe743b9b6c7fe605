//! Session persistence and client construction.

mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use docapi_http::DocClient;

use crate::cli::ConnectionArgs;

pub use storage::{FileTokenStore, default_session_path};

/// A client wired to the on-disk session.
pub struct Session {
    pub client: DocClient,
    pub store: Arc<FileTokenStore>,
}

impl Session {
    /// Open the session file and build a client for the resolved backend.
    ///
    /// `--url` wins; otherwise the URL recorded at login is reused.
    pub fn open(args: &ConnectionArgs) -> Result<Self> {
        let path = match &args.session_file {
            Some(path) => path.clone(),
            None => default_session_path()?,
        };
        let store = Arc::new(FileTokenStore::open(&path)?);
        debug!(path = %store.path().display(), "Opened session file");

        let url = args
            .url
            .clone()
            .or_else(|| store.api_url())
            .context("No backend URL. Pass --url or set DOCAPI_URL")?;

        let mut builder = DocClient::builder(&url)
            .token_store(store.clone())
            .debug(args.debug)
            .tokens_enabled(!args.no_tokens);
        if let Some(api_key) = &args.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(secs) = args.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .with_context(|| format!("Cannot connect to {url}"))?;

        Ok(Self { client, store })
    }
}
