//! Error types for the Ghar Nishchit API client.
//!
//! # Design
//! Callers branch on two cases: the server answered with a failure status
//! (`Request`, which carries the status) or no answer arrived (`Network` and
//! `Timeout`, which carry none). The remaining variants cover local failures
//! around that round trip.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::payload::Payload;

/// Connectivity message shown instead of transport internals.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error: unable to reach the server. Please check your connection.";

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by every `ApiClient` operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned a non-2xx status.
    #[error("{message}")]
    Request {
        status: u16,
        message: String,
        body: Payload,
    },

    /// No HTTP response was obtained.
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The configured deadline elapsed before a response arrived.
    #[error("request timed out{}", deadline_suffix(.after))]
    Timeout { after: Option<Duration> },

    /// A successful response did not have the expected shape.
    #[error("unexpected response payload: {message}")]
    Decode { message: String },

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {message}")]
    Serialization { message: String },

    /// The base URL cannot be used to build requests.
    #[error("invalid client configuration: {message}")]
    Config { message: String },
}

impl ApiError {
    /// Build a `Request` error from a failure status and its raw body.
    pub fn from_failure(status: u16, raw_body: &str) -> Self {
        let body = Payload::from_error_body(raw_body);
        let message = failure_message(status, &body);
        ApiError::Request {
            status,
            message,
            body,
        }
    }

    pub fn network(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Network {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            source: Some(source.into()),
        }
    }

    /// HTTP status, present only when the server actually answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed failure body, when the server sent one.
    pub fn body(&self) -> Option<&Payload> {
        match self {
            ApiError::Request { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }
}

/// Pick the most specific human-readable message for a failure.
///
/// Order: `message` field, `error` field, raw text, status reason phrase,
/// generic fallback.
fn failure_message(status: u16, body: &Payload) -> String {
    match body {
        Payload::Json(Value::String(text)) | Payload::Text(text) if !text.trim().is_empty() => {
            return text.clone();
        }
        Payload::Json(value) => {
            if let Some(message) = field_text(value, "message").or_else(|| field_text(value, "error")) {
                return message;
            }
        }
        _ => {}
    }

    ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

fn deadline_suffix(after: &Option<Duration>) -> String {
    after
        .map(|deadline| format!(" after {}ms", deadline.as_millis()))
        .unwrap_or_default()
}

fn field_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_is_used_verbatim() {
        let err = ApiError::from_failure(400, r#"{"message":"Title is required","error":"x"}"#);
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn error_field_is_second_choice() {
        let err = ApiError::from_failure(401, r#"{"error":"Unauthorized"}"#);
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn raw_text_beats_status_text() {
        let err = ApiError::from_failure(502, "upstream exploded");
        assert_eq!(err.to_string(), "upstream exploded");
        assert_eq!(err.body(), Some(&Payload::Text("upstream exploded".to_string())));
    }

    #[test]
    fn empty_body_falls_back_to_reason_phrase() {
        let err = ApiError::from_failure(404, "");
        assert_eq!(err.to_string(), "Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn json_object_without_message_uses_reason_phrase() {
        let err = ApiError::from_failure(500, r#"{"code":17}"#);
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn unknown_status_uses_generic_fallback() {
        let err = ApiError::from_failure(599, "");
        assert_eq!(err.to_string(), "Request failed with status 599");
    }

    #[test]
    fn network_error_hides_transport_text() {
        let err = ApiError::network("dns lookup failed for localhost:5000");
        assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
        assert!(err.status().is_none());
        assert!(err.is_network());
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("dns lookup failed for localhost:5000"));
    }

    #[test]
    fn timeout_reports_deadline() {
        let err = ApiError::Timeout {
            after: Some(Duration::from_millis(250)),
        };
        assert_eq!(err.to_string(), "request timed out after 250ms");
        assert!(err.status().is_none());
    }
}
