//! Forum endpoints
//!
//! Topic reads use a bare `{data: ...}` envelope; the comment endpoints
//! return their payloads unwrapped.

use chorushub_domain::{ForumComment, ForumTopic, NewComment};
use serde::Deserialize;

use super::client::ApiClient;
use super::errors::ApiError;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Fetch the current discussion topic via `GET /api/forum/topic`.
///
/// # Errors
/// Returns [`ApiError`] if the call fails.
pub async fn current_topic(client: &ApiClient) -> Result<ForumTopic, ApiError> {
    let envelope: DataEnvelope<ForumTopic> = client.get("/api/forum/topic").await?;
    Ok(envelope.data)
}

/// Fetch previous discussion topics via `GET /api/forum/past-topics`.
///
/// # Errors
/// Returns [`ApiError`] if the call fails.
pub async fn past_topics(client: &ApiClient) -> Result<Vec<ForumTopic>, ApiError> {
    let envelope: DataEnvelope<Vec<ForumTopic>> = client.get("/api/forum/past-topics").await?;
    Ok(envelope.data)
}

/// Fetch the comments for a topic via `GET /api/forum/comments?topicId=`.
///
/// # Errors
/// Returns [`ApiError`] if the call fails.
pub async fn comments(client: &ApiClient, topic_id: &str) -> Result<Vec<ForumComment>, ApiError> {
    client.get_with_query("/api/forum/comments", &[("topicId", topic_id)]).await
}

/// Post a comment via `POST /api/forum/comments`.
///
/// # Errors
/// Returns [`ApiError`] if the call fails. Callers keep the typed-in text
/// on failure so the user can retry.
pub async fn post_comment(
    client: &ApiClient,
    comment: &NewComment,
) -> Result<ForumComment, ApiError> {
    client.post("/api/forum/comments", comment).await
}
