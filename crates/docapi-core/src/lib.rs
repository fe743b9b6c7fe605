//! docapi-core - Core types and traits for the docapi REST client.
//!
//! The [`ApiResponse`] envelope is the single result shape every client
//! operation returns. The [`Transport`] and [`TokenStore`] traits are the
//! seams where a host application plugs in its HTTP stack and credential
//! storage.

pub mod credentials;
pub mod envelope;
pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use envelope::{ApiResponse, Message, ResponseOverrides, ResponseParts};
pub use error::Error;
pub use tokens::{AccessToken, ApiKey, RefreshToken};
pub use traits::{HttpRequest, HttpResponse, MemoryTokenStore, Method, TokenStore, Transport};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
