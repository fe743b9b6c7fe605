//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{
    login::LoginArgs, logout::LogoutArgs, request::RequestArgs, whoami::WhoamiArgs,
};

/// Command line client for docapi backends.
#[derive(Parser, Debug)]
#[command(name = "docapi")]
#[command(author, version = env!("DOCAPI_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how to connect.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Backend base URL (defaults to the URL of the stored session)
    #[arg(long, env = "DOCAPI_URL", global = true)]
    pub url: Option<String>,

    /// Authenticate with a static API key instead of session tokens
    #[arg(long, env = "DOCAPI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "DOCAPI_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Log response headers
    #[arg(long, global = true)]
    pub debug: bool,

    /// Do not attach the access token to requests
    #[arg(long, global = true)]
    pub no_tokens: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session tokens
    Login(LoginArgs),

    /// Log out and clear the stored tokens
    Logout(LogoutArgs),

    /// Show the authenticated user
    Whoami(WhoamiArgs),

    /// Send an authenticated request
    Request(RequestArgs),
}
