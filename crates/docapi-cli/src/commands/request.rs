//! Generic request command.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;

use docapi_core::Method;

use crate::output;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method
    #[arg(value_enum, ignore_case = true)]
    pub method: MethodArg,

    /// Command path appended to the backend URL (e.g. /api/v1/documents)
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Print the payload as a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "UPPER")]
pub enum MethodArg {
    Get,
    Post,
    Put,
    Delete,
}

impl From<MethodArg> for Method {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Get => Method::Get,
            MethodArg::Post => Method::Post,
            MethodArg::Put => Method::Put,
            MethodArg::Delete => Method::Delete,
        }
    }
}

pub async fn run(session: Session, args: RequestArgs) -> Result<()> {
    let body: Option<Value> = args
        .body
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--body is not valid JSON")?;

    let reply = session
        .client
        .request::<Value, Value>(args.method.into(), &args.path, body.as_ref())
        .await;
    output::envelope(&reply, args.compact)
}
