//! Logout command.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Revoke this token instead of the current session
    #[arg(long)]
    pub token: Option<String>,
}

pub async fn run(session: Session, args: LogoutArgs) -> Result<()> {
    let reply = session.client.logout(args.token.as_deref()).await;
    if !reply.success() {
        return output::failed(&reply);
    }

    output::success(reply.message());
    Ok(())
}
