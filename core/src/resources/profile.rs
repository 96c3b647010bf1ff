//! The signed-in user's profile under `/auth`.
//!
//! These calls only succeed when the credential provider yields a token.

use serde::Serialize;
use serde_json::Value;

use crate::client::{decode_record, ApiClient};
use crate::error::ApiResult;
use crate::http::HttpMethod;
use crate::types::{ChangePassword, Record};

const AUTH: &str = "auth";

/// The signed-in user's account.
#[derive(Debug, Clone, Copy)]
pub struct Profile<'a> {
    client: &'a ApiClient,
}

impl<'a> Profile<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn get(&self) -> ApiResult<Record> {
        decode_record(self.client.get(&[AUTH, "profile"], None)?)
    }

    /// Send only the changed fields.
    pub fn update<B: Serialize + ?Sized>(&self, changes: &B) -> ApiResult<Record> {
        decode_record(self.client.call(HttpMethod::Put, &[AUTH, "profile"], None, Some(changes))?)
    }

    /// Returns the server's confirmation payload as-is.
    pub fn change_password(&self, change: &ChangePassword) -> ApiResult<Value> {
        let payload = self
            .client
            .call(HttpMethod::Post, &[AUTH, "change-password"], None, Some(change))?;
        Ok(payload.into_value())
    }
}
