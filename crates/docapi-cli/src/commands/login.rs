//! Login command.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use docapi_core::Credentials;

use crate::output;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account login
    #[arg(long, env = "DOCAPI_LOGIN")]
    pub login: String,

    /// Account password
    #[arg(long, env = "DOCAPI_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Optional tenant domain
    #[arg(long)]
    pub domain: Option<String>,

    /// Optional device fingerprint
    #[arg(long)]
    pub fingerprint: Option<String>,
}

pub async fn run(session: Session, args: LoginArgs) -> Result<()> {
    let mut credentials = Credentials::new(args.login, args.password);
    if let Some(domain) = args.domain {
        credentials = credentials.with_domain(domain);
    }
    if let Some(fingerprint) = args.fingerprint {
        credentials = credentials.with_fingerprint(fingerprint);
    }

    let reply = session.client.login(&credentials).await;
    if !reply.is_success() {
        return output::failed(&reply);
    }

    session
        .store
        .set_api_url(session.client.api_url().as_str())
        .context("Failed to save session")?;
    info!(path = %session.store.path().display(), "Session saved");

    output::success(&format!("Logged in as {}", credentials.login()));
    output::field("Backend", session.client.api_url().as_str());
    output::field("Session", &session.store.path().display().to_string());
    Ok(())
}
