//! Persisted credential storage
//!
//! The session layer never touches a concrete store directly; everything
//! goes through the [`CredentialStore`] capability so tests can swap in the
//! in-memory double from [`crate::testing`]. The production implementation
//! wraps the platform keychain (macOS Keychain, Windows Credential Manager,
//! Linux Secret Service).

use async_trait::async_trait;
use chorushub_domain::HubError;
use keyring::Entry;
use tracing::debug;

/// Storage key for the bearer credential.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the cached username.
pub const USERNAME_KEY: &str = "username";

/// Capability interface over a client-local key-value store.
///
/// Absence of a key is not an error; it simply reads back as `None`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a value, or `None` if the key has never been written.
    ///
    /// # Errors
    /// Returns `HubError::Storage` if the underlying store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, HubError>;

    /// Persist a value under the given key, replacing any previous value.
    ///
    /// # Errors
    /// Returns `HubError::Storage` if the write fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), HubError>;

    /// Remove a value (idempotent; removing a missing key succeeds).
    ///
    /// # Errors
    /// Returns `HubError::Storage` if the deletion fails for any reason
    /// other than the key not existing.
    async fn remove(&self, key: &str) -> Result<(), HubError>;
}

/// Credential store backed by the platform keychain.
///
/// Entries are scoped under a service name so multiple ChorusHub builds
/// (or tests) can coexist without clobbering each other.
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    /// Create a store scoped to the given keychain service name
    /// (e.g. `"ChorusHub"`).
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    fn entry(&self, key: &str) -> Result<Entry, HubError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            HubError::Storage(format!("Failed to access keychain entry for {key}: {e}"))
        })
    }
}

#[async_trait]
impl CredentialStore for KeychainStore {
    async fn get(&self, key: &str) -> Result<Option<String>, HubError> {
        debug!(service = %self.service_name, key = %key, "Reading credential");

        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                Err(HubError::Storage(format!("Failed to read credential for {key}: {e}")))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), HubError> {
        debug!(service = %self.service_name, key = %key, "Storing credential");

        self.entry(key)?.set_password(value).map_err(|e| {
            HubError::Storage(format!("Failed to store credential for {key}: {e}"))
        })
    }

    async fn remove(&self, key: &str) -> Result<(), HubError> {
        debug!(service = %self.service_name, key = %key, "Deleting credential");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                Err(HubError::Storage(format!("Failed to delete credential for {key}: {e}")))
            }
        }
    }
}
