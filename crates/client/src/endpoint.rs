//! Backend origin selection
//!
//! Decides whether the client talks to the primary (local development)
//! or secondary (hosted) backend origin, caches that decision for the
//! process lifetime in production-like contexts, and coalesces concurrent
//! resolution requests so only one decision is ever in flight.
//!
//! A failover (see the API client) pins the origin to secondary for the
//! remainder of the process.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};

/// A backend network address class the client connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Local development backend.
    Primary,
    /// Hosted production backend.
    Secondary,
}

/// Inputs to the origin decision plus the two origin URLs.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Origin used in development-like contexts.
    pub primary_url: String,
    /// Origin used in production-like contexts and after failover.
    pub secondary_url: String,
    /// Build/runtime development flag.
    pub development: bool,
    /// Host the client is currently being served from, when known.
    pub request_host: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            primary_url: "http://localhost:5000".to_string(),
            secondary_url: "https://chorushub-api.onrender.com".to_string(),
            development: cfg!(debug_assertions),
            request_host: None,
        }
    }
}

impl EndpointConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `CHORUSHUB_PRIMARY_URL`,
    /// `CHORUSHUB_SECONDARY_URL`, `CHORUSHUB_DEV` (`1`/`true`),
    /// `CHORUSHUB_REQUEST_HOST`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("CHORUSHUB_PRIMARY_URL") {
            config.primary_url = url;
        }
        if let Ok(url) = env::var("CHORUSHUB_SECONDARY_URL") {
            config.secondary_url = url;
        }
        if let Ok(flag) = env::var("CHORUSHUB_DEV") {
            config.development = matches!(flag.as_str(), "1" | "true" | "TRUE");
        }
        if let Ok(host) = env::var("CHORUSHUB_REQUEST_HOST") {
            config.request_host = Some(host);
        }

        config
    }
}

/// Resolves and caches the backend origin for this process.
pub struct EndpointResolver {
    config: EndpointConfig,
    /// Settled decision; concurrent callers coalesce on the lock so only
    /// one decision is ever computed at a time.
    cached: Mutex<Option<Origin>>,
    /// Set once by failover; wins over everything else afterwards.
    failed_over: AtomicBool,
}

impl EndpointResolver {
    /// Create a resolver over the given endpoint configuration.
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        Self { config, cached: Mutex::new(None), failed_over: AtomicBool::new(false) }
    }

    /// Resolve the current origin.
    ///
    /// Callers that arrive while a resolution is in flight await the same
    /// pending decision. In a production-like context the first decision is
    /// cached for the process lifetime; in a development-like context the
    /// rule is re-evaluated per call (the failover pin still wins).
    pub async fn resolve(&self) -> Origin {
        if self.failed_over.load(Ordering::Acquire) {
            return Origin::Secondary;
        }

        let mut cached = self.cached.lock().await;

        // The pin may have landed while we waited for the lock.
        if self.failed_over.load(Ordering::Acquire) {
            return Origin::Secondary;
        }

        if !self.config.development {
            if let Some(origin) = *cached {
                return origin;
            }
        }

        let origin = self.decide();
        *cached = Some(origin);
        debug!(?origin, development = self.config.development, "Resolved backend origin");
        origin
    }

    /// The decision rule: primary iff the environment is development-like
    /// or the request host is a loopback address.
    fn decide(&self) -> Origin {
        let loopback =
            self.config.request_host.as_deref().is_some_and(is_loopback_host);

        if self.config.development || loopback {
            Origin::Primary
        } else {
            Origin::Secondary
        }
    }

    /// Pin the origin to secondary for the remaining process lifetime.
    ///
    /// Called by the API client when a primary transport failure triggers
    /// the one-time failover.
    pub fn force_secondary(&self) {
        if !self.failed_over.swap(true, Ordering::AcqRel) {
            info!("Failing over to secondary origin for the rest of this process");
        }
    }

    /// Whether a failover has pinned the secondary origin.
    #[must_use]
    pub fn has_failed_over(&self) -> bool {
        self.failed_over.load(Ordering::Acquire)
    }

    /// Clear the cached decision and the failover pin, forcing a full
    /// re-resolution on the next call. Test/recovery hook.
    pub async fn reset(&self) {
        *self.cached.lock().await = None;
        self.failed_over.store(false, Ordering::Release);
        debug!("Endpoint resolver reset");
    }

    /// Base URL for the given origin.
    #[must_use]
    pub fn base_url(&self, origin: Origin) -> &str {
        match origin {
            Origin::Primary => &self.config.primary_url,
            Origin::Secondary => &self.config.secondary_url,
        }
    }

    /// The configuration this resolver decides over.
    #[must_use]
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

fn is_loopback_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
}

#[cfg(test)]
mod tests {
    //! Unit tests for the origin decision rule and the failover pin.
    use super::*;

    fn production_config() -> EndpointConfig {
        EndpointConfig {
            development: false,
            request_host: Some("chorushub.app".to_string()),
            ..EndpointConfig::default()
        }
    }

    /// Validates `EndpointResolver::resolve` behavior for the development
    /// context scenario.
    ///
    /// Assertions:
    /// - Confirms a development-like environment resolves to `Primary`.
    #[tokio::test]
    async fn development_resolves_primary() {
        let resolver = EndpointResolver::new(EndpointConfig {
            development: true,
            ..production_config()
        });

        assert_eq!(resolver.resolve().await, Origin::Primary);
    }

    /// Validates `EndpointResolver::resolve` behavior for the loopback host
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `localhost` and `127.0.0.1` hosts resolve to `Primary`
    ///   even without the development flag.
    #[tokio::test]
    async fn loopback_host_resolves_primary() {
        for host in ["localhost", "127.0.0.1", "::1"] {
            let resolver = EndpointResolver::new(EndpointConfig {
                development: false,
                request_host: Some(host.to_string()),
                ..EndpointConfig::default()
            });
            assert_eq!(resolver.resolve().await, Origin::Primary, "host {host}");
        }
    }

    /// Validates `EndpointResolver::resolve` behavior for the production
    /// context scenario.
    ///
    /// Assertions:
    /// - Confirms a non-development, non-loopback environment resolves to
    ///   `Secondary`, and the decision is stable across calls.
    #[tokio::test]
    async fn production_resolves_secondary_and_caches() {
        let resolver = EndpointResolver::new(production_config());

        assert_eq!(resolver.resolve().await, Origin::Secondary);
        assert_eq!(resolver.resolve().await, Origin::Secondary);
    }

    /// Validates `EndpointResolver::force_secondary` behavior for the
    /// failover pin scenario.
    ///
    /// Assertions:
    /// - Confirms the pin overrides a development-like decision.
    /// - Confirms `reset` clears the pin.
    #[tokio::test]
    async fn failover_pin_wins_until_reset() {
        let resolver = EndpointResolver::new(EndpointConfig {
            development: true,
            ..production_config()
        });

        assert_eq!(resolver.resolve().await, Origin::Primary);

        resolver.force_secondary();
        assert!(resolver.has_failed_over());
        assert_eq!(resolver.resolve().await, Origin::Secondary);

        resolver.reset().await;
        assert_eq!(resolver.resolve().await, Origin::Primary);
    }

    /// Validates `EndpointResolver::resolve` behavior for the concurrent
    /// resolution scenario.
    ///
    /// Assertions:
    /// - Confirms every caller issued before the first decision settles
    ///   receives the identical origin.
    #[tokio::test]
    async fn concurrent_resolution_is_coalesced() {
        let resolver = std::sync::Arc::new(EndpointResolver::new(production_config()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move { resolver.resolve().await }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Origin::Secondary);
        }
    }

    /// Validates `is_loopback_host` behavior for the host classification
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms public hosts are not classified as loopback.
    #[test]
    fn public_hosts_are_not_loopback() {
        assert!(!is_loopback_host("chorushub.app"));
        assert!(!is_loopback_host("localhost.evil.example"));
        assert!(is_loopback_host("localhost"));
    }
}
