//! Test doubles shared by unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chorushub_domain::HubError;

use crate::storage::CredentialStore;

/// In-memory [`CredentialStore`] for tests.
///
/// Besides plain key-value behavior it supports two failure injections:
/// per-key poisoning, where a write is silently replaced with a different
/// value so readback verification can be exercised, and whole-store
/// failure, where every operation errors.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    poisoned: Mutex<HashMap<String, String>>,
    failing: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a value in the store directly, bypassing the async interface.
    pub fn seed(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Make future writes to `key` store `value` instead of what the
    /// caller supplied.
    pub fn poison_key(&self, key: &str, value: &str) {
        self.poisoned
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Make every subsequent operation fail with a storage error.
    pub fn fail_all(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.lock().unwrap().clone()
    }

    fn check_failing(&self) -> Result<(), HubError> {
        if *self.failing.lock().unwrap() {
            return Err(HubError::Storage("injected store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, HubError> {
        self.check_failing()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), HubError> {
        self.check_failing()?;
        let stored = self
            .poisoned
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| value.to_string());
        self.values.lock().unwrap().insert(key.to_string(), stored);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), HubError> {
        self.check_failing()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `MemoryStore` behavior for the plain key-value scenario.
    ///
    /// Assertions:
    /// - Values round-trip through set/get
    /// - Missing keys read as `None`
    /// - Removal is idempotent
    #[tokio::test]
    async fn store_round_trips_values() {
        let store = MemoryStore::new();

        assert_eq!(store.get("token").await.unwrap(), None);
        store.set("token", "a.b.c").await.unwrap();
        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("a.b.c"));
        store.remove("token").await.unwrap();
        store.remove("token").await.unwrap();
        assert_eq!(store.get("token").await.unwrap(), None);
    }

    /// Validates `MemoryStore` behavior for the failure-injection scenario.
    ///
    /// Assertions:
    /// - Poisoned keys store the injected value instead of the written one
    /// - `fail_all` makes every operation error
    #[tokio::test]
    async fn store_supports_failure_injection() {
        let store = MemoryStore::new();

        store.poison_key("token", "something.else.entirely");
        store.set("token", "a.b.c").await.unwrap();
        assert_eq!(
            store.get("token").await.unwrap().as_deref(),
            Some("something.else.entirely")
        );

        store.fail_all();
        assert!(store.get("token").await.is_err());
        assert!(store.set("token", "x").await.is_err());
        assert!(store.remove("token").await.is_err());
    }
}
