//! Session and authentication state
//!
//! # Module Organization
//!
//! - [`manager`]: [`SessionManager`], the single owner of session state
//! - [`credential`]: structural checks on bearer credentials

pub mod credential;
pub mod manager;

pub use manager::{Session, SessionError, SessionManager};
