//! Wire types exchanged with the ChorusHub backend
//!
//! Field names follow the backend's JSON conventions (camelCase, Mongo-style
//! `_id`), so every type carries explicit serde renames rather than relying
//! on the Rust field names.

use serde::{Deserialize, Serialize};

/// An authenticated (or cached) site member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    /// Minimal identity reconstructed from persisted credentials before the
    /// server profile has been fetched.
    #[must_use]
    pub fn from_cached_username(username: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            username: username.into(),
            email: None,
            role: None,
            bio: None,
            created_at: None,
        }
    }

    /// Shallow-merge a patch into this user. Only fields present in the
    /// patch are overwritten.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(role) = patch.role {
            self.role = Some(role);
        }
        if let Some(bio) = patch.bio {
            self.bio = Some(bio);
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = Some(created_at);
        }
    }
}

/// Partial update for [`User`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Standard response envelope used by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Payload of a successful `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: User,
}

/// Payload of a successful `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub message: String,
    pub user: User,
}

/// Body for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A discussion topic on the forum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopic {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    /// Legacy field kept for older topic documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// A comment attached to a forum topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumComment {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub text: String,
    #[serde(rename = "topicId")]
    pub topic_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Body for `POST /api/forum/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub username: String,
    pub text: String,
    #[serde(rename = "topicId")]
    pub topic_id: String,
}

#[cfg(test)]
mod tests {
    //! Unit tests for domain types.
    use super::*;

    /// Validates `User::apply` behavior for the shallow merge scenario.
    ///
    /// Assertions:
    /// - Confirms patched fields are overwritten.
    /// - Confirms fields absent from the patch are untouched.
    #[test]
    fn user_patch_shallow_merge() {
        let mut user = User {
            id: "u1".to_string(),
            username: "alto".to_string(),
            email: Some("alto@example.com".to_string()),
            role: None,
            bio: None,
            created_at: None,
        };

        user.apply(UserPatch { bio: Some("low voice".to_string()), ..UserPatch::default() });

        assert_eq!(user.username, "alto");
        assert_eq!(user.email.as_deref(), Some("alto@example.com"));
        assert_eq!(user.bio.as_deref(), Some("low voice"));
    }

    /// Validates wire deserialization for the login envelope scenario.
    ///
    /// Assertions:
    /// - Confirms the camelCase and `_id` renames round the backend JSON
    ///   into the Rust field names.
    #[test]
    fn login_envelope_deserializes_backend_json() {
        let body = r#"{
            "success": true,
            "data": {
                "token": "a.b.c",
                "user": {"id": "u1", "username": "alto", "createdAt": "2024-01-01"}
            }
        }"#;

        let envelope: ApiResponse<LoginData> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data.token, "a.b.c");
        assert_eq!(data.user.created_at.as_deref(), Some("2024-01-01"));
    }

    /// Validates wire deserialization for the forum comment scenario.
    ///
    /// Assertions:
    /// - Confirms `_id` and `topicId` map onto `id` and `topic_id`.
    #[test]
    fn forum_comment_deserializes_backend_json() {
        let body = r#"{
            "_id": "c1",
            "username": "alto",
            "text": "nice topic",
            "topicId": "t1",
            "createdAt": "2024-02-02"
        }"#;

        let comment: ForumComment = serde_json::from_str(body).unwrap();
        assert_eq!(comment.id, "c1");
        assert_eq!(comment.topic_id, "t1");
    }
}
