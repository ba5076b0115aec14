//! Status classification
//!
//! Maps a response status to the error taxonomy. The API reports failures
//! as `{"error": {"type": "...", "message": "..."}}`, occasionally as a bare
//! `{"error": "NOT_FOUND"}`; the message is attached when present.

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};
use crate::transport::HttpResponse;

/// Classify a status and body.
///
/// Returns `None` for anything that is not an error: every documented
/// failure status maps to its [`ErrorKind`], other 4xx/5xx statuses become
/// [`Error::UnexpectedStatus`], and unknown 1xx-3xx statuses pass through.
pub fn classify(status: u16, body: &str) -> Option<Error> {
    if let Some(kind) = ErrorKind::from_status(status) {
        let message = error_message(body).unwrap_or_else(|| kind.description().to_string());
        return Some(Error::Api { kind, message });
    }

    if status >= 400 {
        let message = error_message(body).unwrap_or_else(|| format!("HTTP status {status}"));
        return Some(Error::UnexpectedStatus { status, message });
    }

    None
}

/// Turn an error response into an `Err`, pass everything else through
pub fn check(response: HttpResponse) -> Result<HttpResponse> {
    match classify(response.status, &response.body) {
        Some(error) => Err(error),
        None => Ok(response),
    }
}

/// Extract the server-supplied message from an error body
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error") {
        Some(Value::Object(error)) => error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.get("type").and_then(Value::as_str))
            .map(str::to_string),
        Some(Value::String(code)) => Some(code.clone()),
        _ => value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
