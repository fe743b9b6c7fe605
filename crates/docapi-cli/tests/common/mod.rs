#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

use serde_json::{Value, json};
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the CLI binary against `url` with an isolated session file.
pub async fn run_cli(args: &[&str], session_file: &Path, url: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docapi"));
    cmd.args(args);
    cmd.env("DOCAPI_SESSION_FILE", session_file);
    cmd.env_remove("DOCAPI_URL");
    cmd.env_remove("DOCAPI_API_KEY");
    cmd.env_remove("RUST_LOG");
    if let Some(url) = url {
        cmd.env("DOCAPI_URL", url);
    }
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], session_file: &Path, url: Option<&str>) -> String {
    let output = run_cli(args, session_file, url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn read_session(session_file: &Path) -> Value {
    let json = std::fs::read_to_string(session_file).expect("session file");
    serde_json::from_str(&json).expect("session JSON")
}

/// Mount a login endpoint that hands out `access`/`refresh`.
pub async fn mount_login(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Welcome",
            "data": { "accessToken": access, "refreshToken": refresh }
        })))
        .mount(server)
        .await;
}
