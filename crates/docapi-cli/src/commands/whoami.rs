//! Whoami command.

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use crate::output;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Endpoint that describes the authenticated user
    #[arg(long, default_value = "/api/v1/whoami")]
    pub path: String,
}

pub async fn run(session: Session, args: WhoamiArgs) -> Result<()> {
    let reply = session.client.get::<Value>(&args.path).await;
    output::envelope(&reply, false)
}
