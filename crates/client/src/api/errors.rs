//! API-specific error types
//!
//! Classifies failed calls so the session layer and the failover logic can
//! react to the right condition: auth rejections force a logout, transport
//! failures trigger the one-time origin failover, everything else is
//! surfaced as-is.

use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication rejections (401, 403) - force logout during validation
    Auth,
    /// Any other non-success HTTP status - surfaced with code and message
    Http,
    /// Transport-level failures (no response / cannot connect) - trigger
    /// the one-time origin failover, never force logout
    Transport,
    /// Response arrived but could not be decoded
    Decode,
    /// Client-side configuration problems
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the credential (401 or 403).
    #[error("Authentication rejected (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// Any other non-success HTTP status.
    #[error("Request failed (status {status}): {message}")]
    Status { status: u16, message: String },

    /// The request went out but no response ever came back.
    #[error("No response received: {0}")]
    NoResponse(String),

    /// A connection to the origin could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The client itself is misconfigured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth { .. } => ApiErrorCategory::Auth,
            Self::Status { .. } => ApiErrorCategory::Http,
            Self::NoResponse(_) | Self::Connect(_) => ApiErrorCategory::Transport,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether this failure happened below the HTTP layer. Transport
    /// failures are the only condition that arms the origin failover.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.category() == ApiErrorCategory::Transport
    }

    /// Whether the backend explicitly rejected the credential.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// HTTP status code, when the failure carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_timeout() {
            Self::NoResponse(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            // Request aborted mid-flight, redirect loops, and the like:
            // nothing came back, so treat it as a no-response failure.
            Self::NoResponse(err.to_string())
        }
    }
}
