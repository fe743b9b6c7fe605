//! Backend endpoint definitions and request/response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use docapi_core::{AccessToken, RefreshToken};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const LOGIN: &str = "/api/v1/login";

pub const REFRESH: &str = "/api/v1/refresh";

pub const LOGOUT: &str = "/api/v1/logout";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
    pub domain: &'a str,
    pub fingerprint: &'a str,
}

/// Request body for refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Request body for logout. Serializes to `{}` without a token.
#[derive(Debug, Serialize)]
pub(crate) struct LogoutRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
}

/// The `data` payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    /// Any other fields the backend returns alongside the tokens.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `data` payload of a successful refresh.
///
/// A backend that does not rotate refresh tokens may omit `refreshToken`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
}

/// The envelope-like body every backend response carries.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseBody {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ResponseBody {
    /// The backend's own message: `message` first, then `error`.
    pub fn backend_message(&self) -> Option<String> {
        [self.message.as_ref(), self.error.as_ref()]
            .into_iter()
            .flatten()
            .find_map(text_of)
            .map(str::to_string)
    }

    /// Field-level errors, with non-string details rendered as JSON.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        match &self.errors {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(field, detail)| {
                    let detail = match detail {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    (field.clone(), detail)
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}

fn text_of(value: &Value) -> Option<&str> {
    let text = match value {
        Value::String(text) => text.as_str(),
        Value::Object(map) => map.get("message")?.as_str()?,
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}
