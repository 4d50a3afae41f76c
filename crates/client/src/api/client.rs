//! API client with bearer attachment and one-time origin failover
//!
//! Wraps the resolved origin in a lazily-built transport, attaches the
//! persisted bearer credential to every outgoing request, and replays a
//! request exactly once against the secondary origin when the primary
//! fails at the transport level.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::errors::ApiError;
use crate::endpoint::{EndpointConfig, EndpointResolver, Origin};
use crate::http::HttpTransport;
use crate::storage::{CredentialStore, TOKEN_KEY};

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Origin URLs and environment inputs for endpoint resolution.
    pub endpoints: EndpointConfig,
    /// Fixed per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self { endpoints: EndpointConfig::default(), timeout: Duration::from_secs(15) }
    }
}

/// HTTP-based API client for the ChorusHub backend.
pub struct ApiClient {
    resolver: Arc<EndpointResolver>,
    store: Arc<dyn CredentialStore>,
    timeout: Duration,
    /// Transport bound to the currently resolved origin; rebuilt only when
    /// the origin changes.
    transport: RwLock<Option<HttpTransport>>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: ApiClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_resolver(
            Arc::new(EndpointResolver::new(config.endpoints)),
            store,
            config.timeout,
        )
    }

    /// Create a client over an externally owned resolver. Lets tests (and
    /// hosts with several clients) share one origin decision.
    #[must_use]
    pub fn with_resolver(
        resolver: Arc<EndpointResolver>,
        store: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Self {
        Self { resolver, store, timeout, transport: RwLock::new(None) }
    }

    /// The resolver backing this client.
    #[must_use]
    pub fn resolver(&self) -> Arc<EndpointResolver> {
        self.resolver.clone()
    }

    /// Execute a GET request.
    ///
    /// # Errors
    /// Returns [`ApiError`] if the request fails after at most one failover
    /// replay, or the response cannot be decoded.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None, None::<&()>).await
    }

    /// Execute a GET request with a query string.
    ///
    /// # Errors
    /// Returns [`ApiError`] as for [`Self::get`].
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, Some(query), None::<&()>).await
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError`] as for [`Self::get`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.execute(Method::POST, path, None, Some(body)).await
    }

    /// Clear all cached origin and transport state, forcing a full
    /// re-resolution on the next call. Test/recovery hook.
    pub async fn reset(&self) {
        *self.transport.write().await = None;
        self.resolver.reset().await;
        debug!("API client reset");
    }

    async fn execute<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&B>,
    ) -> Result<R, ApiError> {
        let origin = self.resolver.resolve().await;
        let transport = self.transport_for(origin).await?;
        let token = self.stored_token().await;

        let first = self
            .attempt(&transport, method.clone(), path, query, body, token.as_deref())
            .await;

        let response = match first {
            Ok(response) => response,
            Err(err) if err.is_transport() && transport.origin() == Origin::Primary => {
                // One-time failover: pin secondary, rebuild the transport,
                // reattach the same auth header, replay once. A failure of
                // the replay surfaces unmodified.
                warn!(
                    path = %path,
                    error = %err,
                    "Primary origin unreachable; replaying against secondary"
                );
                self.resolver.force_secondary();
                let transport = self.rebind(Origin::Secondary).await?;
                self.attempt(&transport, method, path, query, body, token.as_deref()).await?
            }
            Err(err) => return Err(err),
        };

        Self::decode_response(response).await
    }

    async fn attempt<B: Serialize>(
        &self,
        transport: &HttpTransport,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request =
            transport.request(method, path).header("Content-Type", "application/json");

        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        transport.send(request).await
    }

    /// Transport for `origin`, building it lazily on first use.
    async fn transport_for(&self, origin: Origin) -> Result<HttpTransport, ApiError> {
        {
            let guard = self.transport.read().await;
            if let Some(transport) = guard.as_ref() {
                if transport.origin() == origin {
                    return Ok(transport.clone());
                }
            }
        }
        self.rebind(origin).await
    }

    async fn rebind(&self, origin: Origin) -> Result<HttpTransport, ApiError> {
        let transport =
            HttpTransport::bind(origin, self.resolver.base_url(origin), self.timeout)?;
        *self.transport.write().await = Some(transport.clone());
        debug!(?origin, "Bound transport to origin");
        Ok(transport)
    }

    /// Bearer credential from the persisted store, if any. A store read
    /// failure downgrades the request to unauthenticated rather than
    /// failing it.
    async fn stored_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Could not read stored credential; sending request unauthenticated");
                None
            }
        }
    }

    async fn decode_response<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status_error(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")))
    }

    fn map_status_error(status: StatusCode, body: &str) -> ApiError {
        let message = extract_server_message(body).unwrap_or_else(|| {
            if body.is_empty() {
                format!("request returned status {status}")
            } else {
                body.to_string()
            }
        });

        let code = status.as_u16();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiError::Auth { status: code, message }
        } else {
            ApiError::Status { status: code, message }
        }
    }
}

/// Pull the human-readable `message`/`error` field out of a JSON error
/// body, when the backend sent one.
fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::MemoryStore;

    fn client_against(uri: &str, store: Arc<MemoryStore>) -> ApiClient {
        let config = ApiClientConfig {
            endpoints: EndpointConfig {
                primary_url: uri.to_string(),
                secondary_url: uri.to_string(),
                development: true,
                request_host: None,
            },
            timeout: Duration::from_secs(2),
        };
        ApiClient::new(config, store)
    }

    #[tokio::test]
    async fn get_attaches_bearer_header_when_token_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whoami"))
            .and(header("Authorization", "Bearer a.b.c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "a.b.c").await.unwrap();

        let client = client_against(&server.uri(), store);
        let body: HashMap<String, bool> = client.get("/whoami").await.unwrap();
        assert_eq!(body.get("ok"), Some(&true));
    }

    #[tokio::test]
    async fn get_is_unauthenticated_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = client_against(&server.uri(), Arc::new(MemoryStore::new()));
        let body: HashMap<String, bool> = client.get("/open").await.unwrap();
        assert_eq!(body.get("ok"), Some(&true));

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("Authorization").is_none());
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/protected"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "token expired"})),
            )
            .mount(&server)
            .await;

        let client = client_against(&server.uri(), Arc::new(MemoryStore::new()));
        let err = client.get::<serde_json::Value>("/protected").await.unwrap_err();

        assert!(err.is_auth_rejection());
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("token expired"));
    }

    #[tokio::test]
    async fn other_statuses_map_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = client_against(&server.uri(), Arc::new(MemoryStore::new()));
        let err = client.get::<serde_json::Value>("/missing").await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn post_sends_json_body_and_query_roundtrips() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"echoed": "hello"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("topicId", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_against(&server.uri(), Arc::new(MemoryStore::new()));

        let body: HashMap<String, String> =
            client.post("/echo", &serde_json::json!({"say": "hello"})).await.unwrap();
        assert_eq!(body.get("echoed").map(String::as_str), Some("hello"));

        let items: Vec<serde_json::Value> =
            client.get_with_query("/items", &[("topicId", "t1")]).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn server_message_extraction_prefers_message_field() {
        assert_eq!(
            extract_server_message(r#"{"message": "bad", "error": "worse"}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(extract_server_message(r#"{"error": "worse"}"#).as_deref(), Some("worse"));
        assert_eq!(extract_server_message("not json"), None);
    }
}
