//! Parsed response bodies.
//!
//! A body is either decoded JSON, raw text, or nothing at all. The success
//! path trusts the declared content type and quietly degrades to text when a
//! JSON body does not decode; the error path always tries JSON first because
//! servers are inconsistent about labelling their error bodies.

use serde_json::Value;

use crate::http::HttpResponse;

/// A response body after content negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Empty,
}

impl Payload {
    /// Interpret a 2xx response.
    pub fn from_success(response: &HttpResponse) -> Self {
        if response.status == 204 {
            return Payload::Empty;
        }
        if response.declares_json() {
            if response.body.trim().is_empty() {
                return Payload::Empty;
            }
            return match serde_json::from_str(&response.body) {
                Ok(value) => Payload::Json(value),
                Err(err) => {
                    tracing::debug!(error = %err, "JSON response did not decode, keeping text");
                    Payload::Text(response.body.clone())
                }
            };
        }
        Payload::Text(response.body.clone())
    }

    /// Interpret the body of a non-2xx response.
    pub fn from_error_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Payload::Empty;
        }
        serde_json::from_str(body)
            .map(Payload::Json)
            .unwrap_or_else(|_| Payload::Text(body.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Collapse into a JSON value: text becomes a string, empty becomes null.
    pub fn into_value(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
            Payload::Empty => Value::Null,
        }
    }
}
