//! HTTP transport types: the request envelope and the raw response.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` assembles an
//! `HttpRequest` (method, absolute URL, merged headers, JSON body) and hands
//! it to a `Transport`; whatever comes back is an `HttpResponse` that the
//! client interprets. Keeping these as owned values lets tests build and
//! inspect them without any network.

use std::fmt;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An assembled request envelope.
///
/// `url` is absolute (base URL, path segments and query already joined).
/// `headers` holds the merged header set in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Shorthand for a response declaring `Content-Type: application/json`.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body).with_header(CONTENT_TYPE, APPLICATION_JSON)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True for `application/json` and structured `+json` media types.
    pub fn declares_json(&self) -> bool {
        self.content_type().is_some_and(|value| {
            let essence = value.split(';').next().unwrap_or_default().trim();
            essence.eq_ignore_ascii_case(APPLICATION_JSON)
                || essence.to_ascii_lowercase().ends_with("+json")
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Merge the default JSON content type, the bearer token and caller headers.
///
/// Later sources win over earlier ones on a case-insensitive name match, so
/// caller headers override both the default and the authorization header.
/// A missing or blank token never produces an `Authorization` header.
pub fn merge_headers(token: Option<&str>, extra: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())];

    if let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) {
        set_header(&mut merged, AUTHORIZATION, format!("Bearer {token}"));
    }
    for (name, value) in extra {
        set_header(&mut merged, name, value.clone());
    }
    merged
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(slot) => *slot = (name.to_string(), value),
        None => headers.push((name.to_string(), value)),
    }
}
