//! # ChorusHub Domain
//!
//! Wire and data types shared between the ChorusHub client crates.
//!
//! This crate contains:
//! - Backend wire types (`User`, `ForumTopic`, `ForumComment`, envelopes)
//! - Request body types for the auth and forum endpoints
//! - The shared error type and Result definition
//!
//! ## Architecture
//! - No dependencies on other ChorusHub crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
