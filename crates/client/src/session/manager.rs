//! Session lifecycle management.
//!
//! [`SessionManager`] owns the in-memory authentication state and keeps it
//! consistent with the persisted credential store. Startup restoration is
//! optimistic: a stored, well-formed credential is trusted immediately so
//! the caller can render an authenticated view, then revalidated against
//! the backend in the same call. Only an explicit rejection (401/403)
//! demotes the session; transport failures retain it.

use std::collections::HashMap;
use std::sync::Arc;

use chorushub_domain::{User, UserPatch};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::api::{self, ApiClient};
use crate::storage::{CredentialStore, TOKEN_KEY, USERNAME_KEY};

use super::credential;

/// Failures surfaced by session operations.
///
/// Transport and backend failures never appear here; the session layer
/// either absorbs them (revalidation, logout) or the caller sees them
/// through the API layer directly.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The supplied credential does not have the expected shape.
    #[error("credential is not well-formed")]
    TokenFormat,

    /// The store accepted a write but read back something different.
    #[error("credential store read back a different value than was written")]
    StorageConsistency,

    /// The underlying credential store failed.
    #[error("credential storage failed: {0}")]
    Storage(String),
}

/// A point-in-time snapshot of the session state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The signed-in user, or `None` when anonymous.
    pub user: Option<User>,
    /// The bearer credential backing the session.
    pub token: Option<String>,
    /// True until the first `initialize` completes.
    pub loading: bool,
    /// True once `initialize` has run, whatever its outcome.
    pub initialized: bool,
}

/// Owns authentication state for the lifetime of the client.
///
/// All mutation goes through this type so the in-memory view and the
/// persisted store can never silently diverge: writes are verified by
/// readback, and memory is only updated after persistence succeeds.
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: Arc<dyn CredentialStore>,
    state: RwLock<Session>,
}

impl SessionManager {
    /// Create a manager in the pre-initialization state.
    ///
    /// The session reports `loading` until [`initialize`](Self::initialize)
    /// has run once.
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(Session {
                loading: true,
                ..Session::default()
            }),
        }
    }

    /// Restore a persisted session, if one exists, and revalidate it.
    ///
    /// Outcomes:
    /// - no stored credential: the session becomes anonymous
    /// - malformed stored credential: persisted values are cleared and the
    ///   session becomes anonymous
    /// - well-formed credential: the session is populated from the cache
    ///   immediately, then the profile endpoint is consulted. A fresh
    ///   profile replaces the cached user; a 401/403 signs the session
    ///   out; any other failure retains the optimistic state.
    ///
    /// Repeated calls after the first are no-ops. Whatever the outcome,
    /// `loading` is cleared and `initialized` is set exactly once.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        {
            let state = self.state.read().await;
            if state.initialized {
                return;
            }
        }

        self.restore_session().await;

        let mut state = self.state.write().await;
        state.loading = false;
        state.initialized = true;
    }

    async fn restore_session(&self) {
        let token = match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "Could not read stored credential; starting anonymous");
                return;
            }
        };
        let username = self.store.get(USERNAME_KEY).await.unwrap_or_default();

        let (token, username) = match (token, username) {
            (Some(token), Some(username)) => (token, username),
            _ => {
                debug!("No stored session");
                return;
            }
        };

        if !credential::is_well_formed(&token) {
            warn!("Stored credential is malformed; clearing it");
            self.clear_persisted().await;
            return;
        }

        {
            let mut state = self.state.write().await;
            state.token = Some(token);
            state.user = Some(User::from_cached_username(&username));
        }
        debug!(%username, "Restored session optimistically");

        match api::auth::profile(&self.api).await {
            Ok(user) => {
                let mut state = self.state.write().await;
                state.user = Some(user);
                debug!("Revalidated stored session");
            }
            Err(error) if error.is_auth_rejection() => {
                info!(%error, "Stored credential rejected; signing out");
                self.logout().await;
            }
            Err(error) => {
                warn!(%error, "Could not revalidate session; retaining cached identity");
            }
        }
    }

    /// Establish a session from a fresh login.
    ///
    /// The credential is shape-checked before anything is written. Both
    /// values are persisted and read back; if either readback differs from
    /// what was written, the in-memory session is left untouched and
    /// [`SessionError::StorageConsistency`] is returned. After the session
    /// is established, the profile endpoint is consulted to enrich the user
    /// record; failure there is absorbed.
    ///
    /// # Errors
    /// Returns [`SessionError`] if the credential is malformed, the store
    /// fails, or readback does not match what was written.
    #[instrument(skip_all, fields(username = %user.username))]
    pub async fn login(&self, user: User, credential: &str) -> Result<(), SessionError> {
        if !credential::is_well_formed(credential) {
            return Err(SessionError::TokenFormat);
        }

        self.store
            .set(TOKEN_KEY, credential)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        self.store
            .set(USERNAME_KEY, &user.username)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        let token_back = self
            .store
            .get(TOKEN_KEY)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let username_back = self
            .store
            .get(USERNAME_KEY)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        if token_back.as_deref() != Some(credential)
            || username_back.as_deref() != Some(user.username.as_str())
        {
            warn!("Credential store readback mismatch after login");
            return Err(SessionError::StorageConsistency);
        }

        {
            let mut state = self.state.write().await;
            state.token = Some(credential.to_string());
            state.user = Some(user);
        }
        info!("Session established");

        match api::auth::profile(&self.api).await {
            Ok(fresh) => {
                let mut state = self.state.write().await;
                state.user = Some(fresh);
            }
            Err(error) => {
                debug!(%error, "Profile enrichment after login failed; keeping login payload");
            }
        }

        Ok(())
    }

    /// End the session, clearing both persisted and in-memory state.
    ///
    /// Idempotent; logging out while anonymous succeeds. Store failures
    /// are logged and absorbed so the in-memory sign-out always happens.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(error) = self.store.remove(TOKEN_KEY).await {
            warn!(%error, "Could not remove stored credential");
        }
        if let Err(error) = self.store.remove(USERNAME_KEY).await {
            warn!(%error, "Could not remove stored username");
        }

        let mut state = self.state.write().await;
        state.user = None;
        state.token = None;
        info!("Session ended");
    }

    /// True when a user is signed in.
    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state.user.is_some() && state.token.is_some()
    }

    /// Request headers carrying the session credential, or an empty map
    /// when anonymous.
    pub async fn auth_header(&self) -> HashMap<String, String> {
        let state = self.state.read().await;
        match &state.token {
            Some(token) => {
                let mut headers = HashMap::with_capacity(1);
                headers.insert("Authorization".to_string(), format!("Bearer {token}"));
                headers
            }
            None => HashMap::new(),
        }
    }

    /// Shallow-merge a patch into the signed-in user.
    ///
    /// A no-op while anonymous; only fields present in the patch change.
    pub async fn update_user(&self, patch: UserPatch) {
        let mut state = self.state.write().await;
        if let Some(user) = state.user.as_mut() {
            user.apply(patch);
        }
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// The session credential, if any.
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    /// True until the first [`initialize`](Self::initialize) completes.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// True once [`initialize`](Self::initialize) has run.
    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }

    async fn clear_persisted(&self) {
        if let Err(error) = self.store.remove(TOKEN_KEY).await {
            warn!(%error, "Could not clear stored credential");
        }
        if let Err(error) = self.store.remove(USERNAME_KEY).await {
            warn!(%error, "Could not clear stored username");
        }
    }
}
