//! HTTP request wrapper for the Ghar Nishchit API.
//!
//! # Design
//! Every resource operation is a fixed method and path, so all of them funnel
//! through `ApiClient::call`: build the envelope, run it through the
//! transport, interpret the response. `build_request` and `parse_response`
//! stay public and I/O free so each half can be checked on its own.
//!
//! There is no retry, cache or request coalescing here. Two calls are two
//! round trips, and concurrent callers share nothing but the credential
//! provider, which is only read.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::config::ClientConfig;
use crate::credentials::{CredentialProvider, NoCredentials};
use crate::error::{ApiError, ApiResult};
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse};
use crate::payload::Payload;
use crate::resources::{Maintenance, Profile, Properties, Tenants};
use crate::transport::{Transport, TransportError, UreqTransport};
use crate::types::{ListQuery, Record};

/// Client for the Ghar Nishchit REST API.
///
/// Cheap to clone; clones share the transport and credential provider.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn Transport>,
    ) -> ApiResult<Self> {
        let base = parse_base(config.base_url())?;
        Ok(Self {
            base,
            config,
            credentials,
            transport,
        })
    }

    /// Unauthenticated client over a `ureq` transport honoring the config timeout.
    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        let transport = UreqTransport::new(config.timeout());
        Self::new(config, Arc::new(NoCredentials), Arc::new(transport))
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn properties(&self) -> Properties<'_> {
        Properties::new(self)
    }

    pub fn profile(&self) -> Profile<'_> {
        Profile::new(self)
    }

    pub fn tenants(&self) -> Tenants<'_> {
        Tenants::new(self)
    }

    pub fn maintenance(&self) -> Maintenance<'_> {
        Maintenance::new(self)
    }

    /// Assemble the envelope for one call.
    ///
    /// Segments are percent-encoded individually and joined onto the base;
    /// the query string is only added when `query` has entries.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: Option<&ListQuery>,
        body: Option<&B>,
        extra_headers: &[(String, String)],
    ) -> ApiResult<HttpRequest> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config {
                message: format!("base URL cannot hold a path: {}", self.base),
            })?
            .pop_if_empty()
            .extend(segments);

        if let Some(query) = query.filter(|query| !query.is_empty()) {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| ApiError::Serialization {
                message: err.to_string(),
            })?;

        let token = self.credentials.token();
        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: merge_headers(token.as_deref(), extra_headers),
            body,
        })
    }

    /// Interpret a response: 2xx becomes a `Payload`, anything else a `Request` error.
    pub fn parse_response(&self, response: HttpResponse) -> ApiResult<Payload> {
        if response.is_success() {
            return Ok(Payload::from_success(&response));
        }
        let err = ApiError::from_failure(response.status, &response.body);
        tracing::warn!(status = response.status, error = %err, "request failed");
        Err(err)
    }

    /// Execute a prepared envelope.
    pub fn send(&self, request: HttpRequest) -> ApiResult<Payload> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request).map_err(|err| {
            tracing::warn!(method = %request.method, url = %request.url, error = %err, "transport failure");
            match err {
                TransportError::Timeout => ApiError::Timeout {
                    after: self.config.timeout(),
                },
                TransportError::Unreachable(detail) => ApiError::network(detail),
                TransportError::BodyRead { status, detail } => ApiError::Request {
                    status,
                    message: format!("failed to read response body: {detail}"),
                    body: Payload::Empty,
                },
            }
        })?;
        tracing::debug!(status = response.status, url = %request.url, "received response");
        self.parse_response(response)
    }

    pub(crate) fn call<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: Option<&ListQuery>,
        body: Option<&B>,
    ) -> ApiResult<Payload> {
        let request = self.build_request(method, segments, query, body, &[])?;
        self.send(request)
    }

    pub(crate) fn get(&self, segments: &[&str], query: Option<&ListQuery>) -> ApiResult<Payload> {
        self.call::<()>(HttpMethod::Get, segments, query, None)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("timeout", &self.config.timeout())
            .finish_non_exhaustive()
    }
}

fn parse_base(base_url: &str) -> ApiResult<Url> {
    let base = Url::parse(base_url).map_err(|err| ApiError::Config {
        message: format!("invalid base URL {base_url:?}: {err}"),
    })?;
    if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
        return Err(ApiError::Config {
            message: format!("base URL must be an absolute http(s) URL: {base_url:?}"),
        });
    }
    Ok(base)
}

/// A single record.
pub fn decode_record(payload: Payload) -> ApiResult<Record> {
    decode(payload)
}

/// A list of records; anything other than a JSON array is rejected.
pub fn decode_records(payload: Payload) -> ApiResult<Vec<Record>> {
    match payload {
        Payload::Json(Value::Array(_)) => decode(payload),
        other => Err(ApiError::Decode {
            message: format!("expected an array of records, got {}", shape(&other)),
        }),
    }
}

/// A JSON object such as a stats aggregate.
pub fn decode_object(payload: Payload) -> ApiResult<Map<String, Value>> {
    match payload.into_value() {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::Decode {
            message: format!("expected an object, got {other}"),
        }),
    }
}

/// Success with no meaningful body; whatever the server sent is discarded.
pub fn expect_empty(_payload: Payload) -> ApiResult<()> {
    Ok(())
}

fn decode<T: DeserializeOwned>(payload: Payload) -> ApiResult<T> {
    serde_json::from_value(payload.into_value()).map_err(|err| ApiError::Decode {
        message: err.to_string(),
    })
}

fn shape(payload: &Payload) -> &'static str {
    match payload {
        Payload::Json(Value::Object(_)) => "an object",
        Payload::Json(_) => "a JSON scalar",
        Payload::Text(_) => "text",
        Payload::Empty => "an empty body",
    }
}
