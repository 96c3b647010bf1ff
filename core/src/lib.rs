//! Typed REST client for the Ghar Nishchit property-management API.
//!
//! # Overview
//! `ApiClient` wraps one HTTP round trip per call: it assembles the request
//! envelope (base URL, JSON body, bearer token, caller headers), hands it to
//! a `Transport`, and turns the response into either a decoded payload or an
//! `ApiError`. Resource views (`properties()`, `profile()`, `tenants()`,
//! `maintenance()`) expose one method per backend endpoint.
//!
//! # Design
//! - The wrapper holds no mutable state; the credential provider is read
//!   once per call and never written.
//! - I/O is confined to `Transport`. `UreqTransport` is the production
//!   implementation; tests substitute closures.
//! - Callers branch on one error type. `ApiError::status()` is `Some` only
//!   when the server actually answered.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod payload;
pub mod resources;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::{normalize_base_url, resolve_base_url, ClientConfig};
pub use credentials::{CredentialProvider, NoCredentials, StaticToken, TokenStore};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use payload::Payload;
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    ChangePassword, ListQuery, MaintenanceFilter, MaintenancePriority, MaintenanceStatus,
    NewComment, Record, StatusUpdate, TechnicianAssignment,
};
