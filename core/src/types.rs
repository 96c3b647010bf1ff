//! Records and request payloads for the Ghar Nishchit API.
//!
//! # Design
//! The backend is a document store and the client does not pin a schema on
//! its records: a `Record` is a server-assigned `id` plus whatever fields the
//! document carries. Only the small bodies whose shape matters to a request
//! (status transitions, password changes, comments, assignments, filters) are
//! typed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A backend document.
///
/// The id is read from `id`, or from `_id` when `id` is absent. Neither key
/// is kept in `fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Map<String, Value>")]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = fields.remove("id");
        let mongo_id = fields.remove("_id");
        match id.or(mongo_id) {
            Some(Value::String(id)) => Ok(Record { id, fields }),
            Some(other) => Err(format!("record id must be a string, got {other}")),
            None => Err("missing field `id`".to_string()),
        }
    }
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

/// Query parameters for list operations, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter. Blank values are dropped.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Lifecycle of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "Pending",
            MaintenanceStatus::InProgress => "In Progress",
            MaintenanceStatus::Completed => "Completed",
            MaintenanceStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Emergency,
}

impl MaintenancePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenancePriority::Low => "Low",
            MaintenancePriority::Medium => "Medium",
            MaintenancePriority::High => "High",
            MaintenancePriority::Emergency => "Emergency",
        }
    }
}

/// Optional filters for maintenance listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceFilter {
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<MaintenancePriority>,
    pub property_id: Option<String>,
}

impl MaintenanceFilter {
    pub fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::new();
        if let Some(status) = self.status {
            query = query.with("status", status.as_str());
        }
        if let Some(priority) = self.priority {
            query = query.with("priority", priority.as_str());
        }
        if let Some(property_id) = &self.property_id {
            query = query.with("propertyId", property_id.as_str());
        }
        query
    }
}

/// Body of a status-only transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: MaintenanceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

/// A comment appended to a maintenance request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Technician assignment; only the provided fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianAssignment {
    pub technician: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
