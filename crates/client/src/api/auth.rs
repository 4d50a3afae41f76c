//! Authentication endpoints
//!
//! Typed wrappers over the backend's auth surface. The auth endpoints wrap
//! their payloads in the `{success, data}` envelope; these helpers unwrap
//! it and treat a malformed envelope as a decode failure, the same way a
//! missing body would be.

use chorushub_domain::{ApiResponse, LoginData, LoginRequest, RegisterData, RegisterRequest, User};
use tracing::debug;

use super::client::ApiClient;
use super::errors::ApiError;

/// Create a new account via `POST /api/auth/register`.
///
/// The full envelope is returned so callers can surface the backend's
/// welcome message alongside the created user.
///
/// # Errors
/// Returns [`ApiError`] if the call fails.
pub async fn register(
    client: &ApiClient,
    request: &RegisterRequest,
) -> Result<ApiResponse<RegisterData>, ApiError> {
    client.post("/api/auth/register", request).await
}

/// Exchange username/password for a bearer credential via
/// `POST /api/auth/login`.
///
/// # Errors
/// Returns [`ApiError`] if the call fails or the envelope is malformed.
pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<LoginData, ApiError> {
    let envelope: ApiResponse<LoginData> = client.post("/api/auth/login", request).await?;
    unwrap_envelope(envelope)
}

/// Fetch the authenticated user's profile via `GET /api/auth/profile`.
///
/// Requires a stored bearer credential; the client attaches it
/// automatically.
///
/// # Errors
/// Returns [`ApiError`] if the call fails or the envelope is malformed.
pub async fn profile(client: &ApiClient) -> Result<User, ApiError> {
    let envelope: ApiResponse<User> = client.get("/api/auth/profile").await?;
    let user = unwrap_envelope(envelope)?;
    debug!(username = %user.username, "Fetched profile");
    Ok(user)
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<T, ApiError> {
    if !envelope.success {
        let message = envelope
            .error
            .or(envelope.message)
            .unwrap_or_else(|| "backend reported failure without a message".to_string());
        return Err(ApiError::Decode(format!("Unexpected response envelope: {message}")));
    }

    envelope
        .data
        .ok_or_else(|| ApiError::Decode("Response envelope is missing its data field".to_string()))
}
