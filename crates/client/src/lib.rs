//! # ChorusHub Client
//!
//! Backend connectivity and session management for the ChorusHub client.
//!
//! This crate contains:
//! - Endpoint resolution with one-time primary/secondary failover
//! - An HTTP API client that attaches stored bearer credentials
//! - Session lifecycle management with optimistic restoration
//! - Translation of API failures into user-facing messages
//!
//! ## Architecture
//! - Depends on `chorushub-domain` for wire types and shared errors
//! - Credential persistence goes through the `CredentialStore` trait
//! - All I/O lives here; the domain crate stays pure

pub mod api;
pub mod endpoint;
pub mod http;
pub mod session;
pub mod storage;
pub mod testing;

// Re-export the types most callers need
pub use api::{user_message, ApiClient, ApiClientConfig, ApiError, ApiErrorCategory};
pub use endpoint::{EndpointConfig, EndpointResolver, Origin};
pub use session::{Session, SessionError, SessionManager};
pub use storage::{CredentialStore, KeychainStore, TOKEN_KEY, USERNAME_KEY};
