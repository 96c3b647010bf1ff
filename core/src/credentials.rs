//! Auth token providers.
//!
//! The client asks its provider for a token once per call and never writes
//! back. `TokenStore` stands in for browser-style client storage: a shared
//! key/value map where sign-in flows put the token.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Storage key the token is written under.
pub const TOKEN_KEY: &str = "token";

/// Older storage key, still read when `TOKEN_KEY` is absent.
pub const LEGACY_TOKEN_KEY: &str = "authToken";

/// Supplies the bearer token for outgoing requests.
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` to send the request unauthenticated.
    fn token(&self) -> Option<String>;
}

/// Never authenticates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        non_blank(Some(self.0.clone()))
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        non_blank(self())
    }
}

/// Shared, thread-safe client storage.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.write().insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.write().remove(key)
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.set(TOKEN_KEY, token);
    }

    /// Drop the token under both keys.
    pub fn clear(&self) {
        let mut entries = self.write();
        entries.remove(TOKEN_KEY);
        entries.remove(LEGACY_TOKEN_KEY);
    }

    /// Move a token stored under the legacy key to the canonical key.
    ///
    /// Returns `true` when a value was moved. A canonical token, if present,
    /// is left alone and the legacy entry is dropped.
    pub fn migrate_legacy(&self) -> bool {
        let mut entries = self.write();
        let Some(legacy) = entries.remove(LEGACY_TOKEN_KEY) else {
            return false;
        };
        if non_blank(entries.get(TOKEN_KEY).cloned()).is_some() || legacy.trim().is_empty() {
            return false;
        }
        entries.insert(TOKEN_KEY.to_string(), legacy);
        true
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialProvider for TokenStore {
    fn token(&self) -> Option<String> {
        non_blank(self.get(TOKEN_KEY)).or_else(|| {
            let legacy = non_blank(self.get(LEGACY_TOKEN_KEY));
            if legacy.is_some() {
                tracing::debug!(key = LEGACY_TOKEN_KEY, "using token from legacy storage key");
            }
            legacy
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|token| !token.trim().is_empty())
}
