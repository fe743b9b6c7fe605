//! docapi-http - Authenticated REST client for docapi backends.
//!
//! [`DocClient`] attaches the right credential to each request, refreshes an
//! expired access token at most once per call, and returns every outcome as
//! a [`docapi_core::ApiResponse`].

mod client;
pub mod endpoints;
mod response;
mod transport;

pub use client::{ClientBuilder, DocClient};
pub use endpoints::{RefreshedTokens, TokenPair};
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, USER_AGENT};
