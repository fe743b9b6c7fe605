//! Capabilities injected into the client.

mod token_store;
mod transport;

pub use token_store::{MemoryTokenStore, TokenStore};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
