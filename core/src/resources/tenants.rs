//! Read-only tenant views under `/tenants`.

use serde_json::{Map, Value};

use crate::client::{decode_object, decode_record, decode_records, ApiClient};
use crate::error::ApiResult;
use crate::types::Record;

const TENANTS: &str = "tenants";

/// Landlord-side view of tenants.
#[derive(Debug, Clone, Copy)]
pub struct Tenants<'a> {
    client: &'a ApiClient,
}

impl<'a> Tenants<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Vec<Record>> {
        decode_records(self.client.get(&[TENANTS], None)?)
    }

    pub fn get(&self, tenant_id: &str) -> ApiResult<Record> {
        decode_record(self.client.get(&[TENANTS, tenant_id], None)?)
    }

    pub fn stats(&self) -> ApiResult<Map<String, Value>> {
        decode_object(self.client.get(&[TENANTS, "stats"], None)?)
    }
}
