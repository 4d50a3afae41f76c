//! Backend API surface
//!
//! # Module Organization
//!
//! - [`client`]: the transport-owning API client (bearer attachment,
//!   one-time failover, `reset()`)
//! - [`errors`]: the [`ApiError`] taxonomy and its category helpers
//! - [`auth`] / [`forum`]: typed endpoint functions
//! - [`translate`]: pure translation of failures into user-facing text

pub mod auth;
pub mod client;
pub mod errors;
pub mod forum;
pub mod translate;

pub use client::{ApiClient, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use translate::user_message;
