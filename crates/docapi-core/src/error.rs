//! Error types for the docapi crates.
//!
//! Client operations report failures through [`ApiResponse`](crate::ApiResponse)
//! envelopes. This error type covers the APIs around them: URL validation,
//! transport construction, token storage and the [`Transport`](crate::Transport)
//! boundary itself.

use thiserror::Error;

/// The unified error type for docapi operations that can fail outside an envelope.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response bodies that could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Token storage failed to read or persist a credential.
    #[error("token storage error: {message}")]
    Storage { message: String },

    /// Input validation errors (invalid URL, bad header value).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Build a storage error from anything displayable.
    pub fn storage(message: impl ToString) -> Self {
        Error::Storage {
            message: message.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The HTTP client could not be built.
    #[error("client setup failed: {message}")]
    Setup { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A response body that is not the JSON shape the caller asked for.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct DecodeError {
    context: &'static str,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    pub fn new(context: &'static str, source: serde_json::Error) -> Self {
        Self { context, source }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
