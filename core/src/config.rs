//! Client configuration and base URL resolution.

use std::time::Duration;

/// Environment variable naming the API base URL, read at runtime and at build time.
pub const BASE_URL_ENV: &str = "GHAR_API_URL";

/// Local development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const API_SEGMENT: &str = "/api";

/// Settings shared by every call made through one `ApiClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Resolve the base URL from the environment with no per-call deadline.
    pub fn from_env() -> Self {
        Self {
            base_url: resolve_base_url(None),
            timeout: None,
        }
    }

    /// Use an injected base URL; it is normalized like any other source.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: resolve_base_url(Some(base_url)),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Normalized base, always ending in a single `/api` segment.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Resolve and normalize the API base URL.
///
/// The first non-blank source wins: the injected value, the runtime
/// `GHAR_API_URL` variable, the `GHAR_API_URL` value captured at build time,
/// then `DEFAULT_BASE_URL`.
pub fn resolve_base_url(injected: Option<&str>) -> String {
    let runtime = std::env::var(BASE_URL_ENV).ok();
    resolve_from(injected, runtime.as_deref(), option_env!("GHAR_API_URL"))
}

fn resolve_from(injected: Option<&str>, runtime: Option<&str>, build_time: Option<&str>) -> String {
    let raw = first_defined([injected, runtime, build_time]).unwrap_or(DEFAULT_BASE_URL);
    normalize_base_url(raw)
}

fn first_defined<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
}

/// Strip trailing slashes and `/api` segments, then append exactly one `/api`.
pub fn normalize_base_url(raw: &str) -> String {
    let mut base = raw.trim();
    loop {
        let trimmed = base.trim_end_matches('/');
        match strip_api_segment(trimmed) {
            Some(rest) => base = rest,
            None => {
                base = trimmed;
                break;
            }
        }
    }
    format!("{base}{API_SEGMENT}")
}

/// Remove a trailing `/api` path segment, never eating into the host.
fn strip_api_segment(base: &str) -> Option<&str> {
    let host_start = base.find("://").map_or(0, |scheme_end| scheme_end + 3);
    let rest = base.strip_suffix(API_SEGMENT)?;
    (rest.len() > host_start).then_some(rest)
}
