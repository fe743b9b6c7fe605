//! The uniform result envelope returned by every client operation.
//!
//! Network failures, non-2xx responses, undecodable bodies and missing
//! credentials all come back as an [`ApiResponse`] with `success == false`,
//! so callers branch on one value instead of matching error types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Default status code for failures.
pub const DEFAULT_ERROR_CODE: u16 = 500;

/// Default status code for successes.
pub const DEFAULT_OK_CODE: u16 = 200;

/// Message used by [`ApiResponse::ok`] when nothing else is supplied.
pub const OK_MESSAGE: &str = "OK";

/// Message used when the source is present but empty, or absent.
pub const NO_MESSAGE: &str = "[no message]";

/// Message used when the source has a shape we cannot read a message from.
pub const UNRECOGNIZED_MESSAGE: &str = "[unrecognized error]";

/// Raw material for an envelope message.
///
/// Normalization rules: text passes through, an error contributes its display
/// text, a JSON value contributes its `message` (or `error`) string field.
/// Anything else resolves to a fixed fallback, so the final message is never
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Plain text.
    Text(String),
    /// A JSON value, typically a backend error body or its `message` field.
    Json(Value),
    /// No message at all.
    Missing,
}

impl Message {
    /// Take the display text of an error.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Message::Text(err.to_string())
    }

    /// Resolve into the final, non-empty message string.
    pub fn resolve(self) -> String {
        let text = match self {
            Message::Text(text) => Some(text),
            Message::Json(value) => Some(message_from_json(value)),
            Message::Missing => None,
        };

        match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => NO_MESSAGE.to_string(),
        }
    }
}

fn message_from_json(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Object(mut map) => {
            for key in ["message", "error"] {
                if let Some(Value::String(text)) = map.remove(key) {
                    return text;
                }
            }
            UNRECOGNIZED_MESSAGE.to_string()
        }
        Value::Null => String::new(),
        _ => UNRECOGNIZED_MESSAGE.to_string(),
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<&String> for Message {
    fn from(text: &String) -> Self {
        Message::Text(text.clone())
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Message::Json(value)
    }
}

impl<M: Into<Message>> From<Option<M>> for Message {
    fn from(message: Option<M>) -> Self {
        message.map_or(Message::Missing, Into::into)
    }
}

/// Every field of an envelope, for the full constructor.
///
/// The defaults describe a generic failure: `success = false`, code 500,
/// no message, no data, no field errors.
#[derive(Debug, Clone)]
pub struct ResponseParts<T> {
    pub success: bool,
    pub code: u16,
    pub message: Message,
    pub data: Option<T>,
    pub errors: BTreeMap<String, String>,
}

impl<T> Default for ResponseParts<T> {
    fn default() -> Self {
        Self {
            success: false,
            code: DEFAULT_ERROR_CODE,
            message: Message::Missing,
            data: None,
            errors: BTreeMap::new(),
        }
    }
}

impl<T> ResponseParts<T> {
    // Right-biased: anything set in `overrides` wins.
    fn merge(mut self, overrides: ResponseOverrides<T>) -> Self {
        if let Some(success) = overrides.success {
            self.success = success;
        }
        if let Some(code) = overrides.code {
            self.code = code;
        }
        if let Some(message) = overrides.message {
            self.message = message;
        }
        if let Some(data) = overrides.data {
            self.data = Some(data);
        }
        if let Some(errors) = overrides.errors {
            self.errors.extend(errors);
        }
        self
    }
}

/// Field overrides applied on top of the [`ApiResponse::ok`] and
/// [`ApiResponse::error`] defaults.
#[derive(Debug, Clone)]
pub struct ResponseOverrides<T> {
    pub success: Option<bool>,
    pub code: Option<u16>,
    pub message: Option<Message>,
    pub data: Option<T>,
    pub errors: Option<BTreeMap<String, String>>,
}

impl<T> Default for ResponseOverrides<T> {
    fn default() -> Self {
        Self {
            success: None,
            code: None,
            message: None,
            data: None,
            errors: None,
        }
    }
}

impl<T> ResponseOverrides<T> {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Field errors merged into the envelope's error map.
    pub fn errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// The outcome of a client operation.
///
/// # Invariants
///
/// - `success() == false` implies `data() == None`
/// - `message()` is never empty
///
/// # Example
///
/// ```
/// use docapi_core::{ApiResponse, ResponseOverrides};
///
/// let ok = ApiResponse::ok(42, ResponseOverrides::new());
/// assert_eq!(ok.success_data(), Some(&42));
///
/// let failed: ApiResponse<i32> =
///     ApiResponse::error("not found", ResponseOverrides::new().code(404));
/// assert!(!failed.is_success());
/// assert_eq!(failed.code(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T = Value> {
    success: bool,
    code: u16,
    message: String,
    data: Option<T>,
    errors: BTreeMap<String, String>,
}

impl<T> ApiResponse<T> {
    /// Full constructor. Drops `data` when `success` is false.
    pub fn from_parts(parts: ResponseParts<T>) -> Self {
        let data = if parts.success { parts.data } else { None };
        Self {
            success: parts.success,
            code: parts.code,
            message: parts.message.resolve(),
            data,
            errors: parts.errors,
        }
    }

    /// A successful envelope: code 200, message "OK", then `overrides`.
    pub fn ok(data: T, overrides: ResponseOverrides<T>) -> Self {
        Self::from_parts(
            ResponseParts {
                success: true,
                code: DEFAULT_OK_CODE,
                message: Message::from(OK_MESSAGE),
                data: Some(data),
                errors: BTreeMap::new(),
            }
            .merge(overrides),
        )
    }

    /// A failed envelope: code 500 and no data, then `overrides`.
    ///
    /// `overrides.data` is ignored; a failure never carries a payload.
    pub fn error(message: impl Into<Message>, overrides: ResponseOverrides<T>) -> Self {
        let mut parts = ResponseParts {
            message: message.into(),
            ..ResponseParts::default()
        }
        .merge(overrides);
        parts.success = false;
        parts.data = None;
        Self::from_parts(parts)
    }

    /// Insert or overwrite one field-level error.
    pub fn add_error(&mut self, field: impl Into<String>, detail: impl Into<String>) {
        self.errors.insert(field.into(), detail.into());
    }

    /// True iff the operation succeeded and produced a payload.
    pub fn is_success(&self) -> bool {
        self.success && self.data.is_some()
    }

    /// The payload, present exactly when [`is_success`](Self::is_success) holds.
    pub fn success_data(&self) -> Option<&T> {
        if self.success { self.data.as_ref() } else { None }
    }

    /// Owned variant of [`success_data`](Self::success_data).
    pub fn into_success(self) -> Option<T> {
        if self.success { self.data } else { None }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Convert the payload type, keeping every other field.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            code: self.code,
            message: self.message,
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}

impl<T> fmt::Display for ApiResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.success { "ok" } else { "error" };
        write!(f, "{} {}: {}", outcome, self.code, self.message)?;
        for (field, detail) in &self.errors {
            write!(f, "; {}: {}", field, detail)?;
        }
        Ok(())
    }
}
