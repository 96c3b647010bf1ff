//! Property listings under `/properties`.
//!
//! Create and update send the caller's body as-is; delete succeeds with no payload.

use serde::Serialize;

use crate::client::{decode_record, decode_records, expect_empty, ApiClient};
use crate::error::ApiResult;
use crate::http::HttpMethod;
use crate::types::Record;

const PROPERTIES: &str = "properties";

/// `/properties` operations.
#[derive(Debug, Clone, Copy)]
pub struct Properties<'a> {
    client: &'a ApiClient,
}

impl<'a> Properties<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Vec<Record>> {
        decode_records(self.client.get(&[PROPERTIES], None)?)
    }

    /// Fails with a 404 `Request` error when the property does not exist.
    pub fn get(&self, id: &str) -> ApiResult<Record> {
        decode_record(self.client.get(&[PROPERTIES, id], None)?)
    }

    /// Create a property; the returned record carries the server-assigned id.
    pub fn create<B: Serialize + ?Sized>(&self, property: &B) -> ApiResult<Record> {
        decode_record(self.client.call(HttpMethod::Post, &[PROPERTIES], None, Some(property))?)
    }

    /// Replace every field of an existing property.
    pub fn update<B: Serialize + ?Sized>(&self, id: &str, property: &B) -> ApiResult<Record> {
        decode_record(self.client.call(HttpMethod::Put, &[PROPERTIES, id], None, Some(property))?)
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        expect_empty(self.client.call::<()>(HttpMethod::Delete, &[PROPERTIES, id], None, None)?)
    }

    /// Properties owned by one landlord.
    pub fn list_by_owner(&self, user_id: &str) -> ApiResult<Vec<Record>> {
        decode_records(self.client.get(&[PROPERTIES, "user", user_id], None)?)
    }
}
