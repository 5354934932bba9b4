//! Status code classification
//!
//! One table for every resource type:
//!
//! | Code    | GET         | POST         | PUT          | DELETE       |
//! |---------|-------------|--------------|--------------|--------------|
//! | 2xx     | success     | success      | success      | success      |
//! | 400/422 | client      | client       | client       | client       |
//! | 403     | forbidden   | forbidden    | forbidden    | forbidden    |
//! | 404     | not found   | not found    | not found    | deleted      |
//! | 409/429 | unexpected  | client       | client       | client       |
//! | 5xx     | server      | server       | server       | server       |
//!
//! DELETE answers 204 and 404 with the same `{"status": "deleted"}` body.

use super::client::ApiResponse;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method};
use serde_json::json;

/// Value of the `status` key returned by a successful delete
pub const DELETED_STATUS: &str = "deleted";

/// Map a response to its decoded body or a typed error
pub fn classify(method: Method, response: ApiResponse) -> Result<JsonValue> {
    let ApiResponse { status, body } = response;

    if method == Method::DELETE && matches!(status, 204 | 404) {
        return Ok(json!({ "status": DELETED_STATUS }));
    }

    match status {
        200..=299 => Ok(body),
        400 | 422 => Err(Error::ClientRequest {
            status: Some(status),
            message: error_message(&body, status),
        }),
        409 | 429 if method.is_write() => Err(Error::ClientRequest {
            status: Some(status),
            message: error_message(&body, status),
        }),
        403 => Err(Error::Forbidden {
            message: error_message(&body, status),
        }),
        404 => Err(Error::NotFound {
            message: error_message(&body, status),
        }),
        500..=599 => Err(Error::Server {
            status,
            message: error_message(&body, status),
        }),
        _ => Err(Error::http_status(status, error_message(&body, status))),
    }
}

/// Extract the server-supplied message from an error body
///
/// The API answers errors with `{"id": "...", "message": "..."}`; anything
/// else falls back to the body text, then to the canonical reason phrase.
pub fn error_message(body: &JsonValue, status: u16) -> String {
    if let Some(message) = body.get("message").and_then(JsonValue::as_str) {
        return message.to_string();
    }
    match body {
        JsonValue::String(s) if !s.is_empty() => s.clone(),
        JsonValue::Null => canonical_reason(status),
        other => other.to_string(),
    }
}

fn canonical_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown status")
        .to_string()
}
