//! Maintenance requests under `/maintenance`.
//!
//! # Design
//! Landlord and tenant listings take a `MaintenanceFilter` that becomes query
//! parameters. The status, comment and assignment calls send small typed
//! bodies; `update` replaces the whole document.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{decode_object, decode_record, decode_records, expect_empty, ApiClient};
use crate::error::ApiResult;
use crate::http::HttpMethod;
use crate::types::{
    MaintenanceFilter, MaintenanceStatus, NewComment, Record, StatusUpdate, TechnicianAssignment,
};

const MAINTENANCE: &str = "maintenance";

/// Maintenance requests raised by tenants and handled by landlords.
///
/// Status changes and technician assignment go through `PATCH` with only
/// the changed fields, so they never overwrite concurrent edits to the rest
/// of the record.
#[derive(Debug, Clone, Copy)]
pub struct Maintenance<'a> {
    client: &'a ApiClient,
}

impl<'a> Maintenance<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn create<B: Serialize + ?Sized>(&self, request: &B) -> ApiResult<Record> {
        decode_record(self.client.call(HttpMethod::Post, &[MAINTENANCE], None, Some(request))?)
    }

    pub fn list_by_landlord(
        &self,
        landlord_id: &str,
        filter: &MaintenanceFilter,
    ) -> ApiResult<Vec<Record>> {
        let query = filter.to_query();
        let payload = self.client.get(&[MAINTENANCE, "landlord", landlord_id], Some(&query))?;
        decode_records(payload)
    }

    /// Empty when the tenant has raised nothing matching `filter`.
    pub fn list_by_tenant(
        &self,
        tenant_id: &str,
        filter: &MaintenanceFilter,
    ) -> ApiResult<Vec<Record>> {
        let query = filter.to_query();
        let payload = self.client.get(&[MAINTENANCE, "tenant", tenant_id], Some(&query))?;
        decode_records(payload)
    }

    pub fn list_by_property(&self, property_id: &str) -> ApiResult<Vec<Record>> {
        decode_records(self.client.get(&[MAINTENANCE, "property", property_id], None)?)
    }

    pub fn get(&self, id: &str) -> ApiResult<Record> {
        decode_record(self.client.get(&[MAINTENANCE, id], None)?)
    }

    pub fn update<B: Serialize + ?Sized>(&self, id: &str, request: &B) -> ApiResult<Record> {
        decode_record(self.client.call(HttpMethod::Put, &[MAINTENANCE, id], None, Some(request))?)
    }

    /// Sends `{"status": ...}` and nothing else.
    pub fn update_status(&self, id: &str, status: MaintenanceStatus) -> ApiResult<Record> {
        let body = StatusUpdate { status };
        let payload =
            self.client
                .call(HttpMethod::Patch, &[MAINTENANCE, id, "status"], None, Some(&body))?;
        decode_record(payload)
    }

    /// Append a comment; returns the updated request.
    pub fn add_comment(&self, id: &str, comment: &NewComment) -> ApiResult<Record> {
        let payload =
            self.client
                .call(HttpMethod::Post, &[MAINTENANCE, id, "comment"], None, Some(comment))?;
        decode_record(payload)
    }

    pub fn assign_technician(
        &self,
        id: &str,
        assignment: &TechnicianAssignment,
    ) -> ApiResult<Record> {
        let payload =
            self.client
                .call(HttpMethod::Patch, &[MAINTENANCE, id, "assign"], None, Some(assignment))?;
        decode_record(payload)
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        expect_empty(self.client.call::<()>(HttpMethod::Delete, &[MAINTENANCE, id], None, None)?)
    }

    /// Per-status counts for one landlord.
    pub fn stats(&self, landlord_id: &str) -> ApiResult<Map<String, Value>> {
        decode_object(self.client.get(&[MAINTENANCE, "stats", landlord_id], None)?)
    }
}
