//! User-facing error translation
//!
//! Pure mapping from a failed call to the text a form renders inline.
//! Infallible: every [`ApiError`] maps to some message.

use super::errors::ApiError;

/// Translate a failed call into a human-readable message.
#[must_use]
pub fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::Auth { status: 403, .. } => {
            "Forbidden: you do not have permission to perform this action.".to_string()
        }
        ApiError::Auth { .. } => "Unauthorized: please log in again.".to_string(),
        ApiError::Status { status: 400, message } => format!("Invalid request: {message}"),
        ApiError::Status { status: 404, .. } => {
            "Not found: the requested resource does not exist.".to_string()
        }
        ApiError::Status { status: 500, .. } => {
            "Server error: please try again later.".to_string()
        }
        ApiError::Status { status, message } => format!("Error (status {status}): {message}"),
        ApiError::NoResponse(_) => {
            "The server did not respond: check your network connection.".to_string()
        }
        ApiError::Connect(_) => {
            "Cannot connect to the server: please make sure it is running.".to_string()
        }
        other => other.to_string(),
    }
}
