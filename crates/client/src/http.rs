//! HTTP transport bound to a single origin
//!
//! A thin wrapper over `reqwest` that remembers which origin it was built
//! for, applies the fixed per-request timeout, and classifies send failures
//! into [`ApiError`]. There is deliberately no retry loop here: the only
//! recovery policy this client has is the one-time origin failover owned by
//! [`crate::api::ApiClient`].

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::api::ApiError;
use crate::endpoint::Origin;

/// A `reqwest` client pinned to one resolved origin.
#[derive(Clone)]
pub struct HttpTransport {
    origin: Origin,
    base_url: String,
    client: ReqwestClient,
}

impl HttpTransport {
    /// Build a transport bound to `origin`, reachable at `base_url`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the underlying client cannot be built.
    pub fn bind(
        origin: Origin,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { origin, base_url: base_url.into(), client })
    }

    /// The origin this transport was built against.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Create a request builder for `path` relative to the bound origin.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Execute the request builder once, classifying transport failures.
    ///
    /// # Errors
    /// Returns the classified [`ApiError`] when no response was obtained.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|err| {
            debug!(origin = ?self.origin, error = %err, "HTTP request failed");
            ApiError::from(err)
        })?;

        debug!(origin = ?self.origin, status = %response.status(), "Received HTTP response");
        Ok(response)
    }
}
