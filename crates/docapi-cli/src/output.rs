//! Output formatting helpers.

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use docapi_core::ApiResponse;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print the payload of a successful envelope, or report a failed one.
///
/// A failed envelope prints its field errors to stderr and becomes an error
/// carrying the message and status code.
pub fn envelope<T: Serialize>(reply: &ApiResponse<T>, compact: bool) -> Result<()> {
    if !reply.success() {
        return failed(reply);
    }

    match reply.data() {
        Some(data) if compact => json(data),
        Some(data) => json_pretty(data),
        None => {
            success(reply.message());
            Ok(())
        }
    }
}

/// Report a failed envelope.
pub fn failed<T>(reply: &ApiResponse<T>) -> Result<()> {
    for (name, detail) in reply.errors() {
        error(&format!("{name}: {detail}"));
    }
    bail!("{} (status {})", reply.message(), reply.code())
}
