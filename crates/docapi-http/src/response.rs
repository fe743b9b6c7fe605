//! Folding raw HTTP responses into envelopes.

use serde::de::DeserializeOwned;
use tracing::debug;

use docapi_core::error::{DecodeError, TransportError};
use docapi_core::{ApiResponse, HttpResponse, ResponseOverrides, ResponseParts};

use crate::endpoints::ResponseBody;

/// Parse a response body. An empty body reads as `{}`.
pub(crate) fn parse_body(response: &HttpResponse) -> Result<ResponseBody, DecodeError> {
    if response.body.trim().is_empty() {
        return Ok(ResponseBody::default());
    }
    serde_json::from_str(&response.body).map_err(|e| DecodeError::new("response body", e))
}

/// Envelope for a 2xx response.
///
/// The backend's `data` is decoded into `R`. A body without `data` yields a
/// successful envelope with no payload; a body that is not JSON, or whose
/// `data` does not fit `R`, is a decode failure.
pub(crate) fn decode_success<R: DeserializeOwned>(
    response: &HttpResponse,
    default_message: &str,
) -> ApiResponse<R> {
    let body = match parse_body(response) {
        Ok(body) => body,
        Err(err) => return decode_failure(err),
    };

    let message = body
        .backend_message()
        .unwrap_or_else(|| default_message.to_string());

    match body.data {
        Some(data) => match serde_json::from_value::<R>(data) {
            Ok(data) => ApiResponse::ok(
                data,
                ResponseOverrides::new()
                    .code(response.status)
                    .message(message),
            ),
            Err(err) => decode_failure(DecodeError::new("response data", err)),
        },
        None => ApiResponse::from_parts(ResponseParts {
            success: true,
            code: response.status,
            message: message.into(),
            data: None,
            errors: Default::default(),
        }),
    }
}

/// Envelope for a non-2xx response.
///
/// The backend's message and field errors win over `fallback`. A body that is
/// not JSON still reports the HTTP status, with the fallback message.
pub(crate) fn failure<R>(response: &HttpResponse, fallback: &str) -> ApiResponse<R> {
    let body = parse_body(response).unwrap_or_else(|err| {
        debug!(status = response.status, error = %err, "error response is not JSON");
        ResponseBody::default()
    });

    let mut overrides = ResponseOverrides::new()
        .code(response.status)
        .errors(body.field_errors());
    if let Some(message) = body.backend_message() {
        overrides = overrides.message(message);
    }

    ApiResponse::error(fallback, overrides)
}

/// Envelope for a request that never produced a response.
pub(crate) fn transport_failure<R>(err: &TransportError) -> ApiResponse<R> {
    ApiResponse::error(err.to_string(), ResponseOverrides::new())
}

/// Envelope for a response we could not read.
pub(crate) fn decode_failure<R>(err: DecodeError) -> ApiResponse<R> {
    ApiResponse::error(err.to_string(), ResponseOverrides::new())
}
