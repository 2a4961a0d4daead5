//! Per-inquiry chat message types
//!
//! Messages are append-only: never updated or deleted by this service.
//! Total order is creation timestamp, ties broken by insertion id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Who sent a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SenderRole {
    Admin,
    User,
}

impl std::fmt::Display for SenderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderRole::Admin => write!(f, "admin"),
            SenderRole::User => write!(f, "user"),
        }
    }
}

/// Request body for posting a message. Either `body` or `image_url` must be
/// present.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    pub body: Option<String>,
    pub image_url: Option<String>,
}

impl PostMessageRequest {
    /// Returns `(body, image_url)` with empty strings normalized away.
    pub fn validate(self) -> Result<(Option<String>, Option<String>), ApiError> {
        let body = self.body.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let image_url = self.image_url.filter(|s| !s.trim().is_empty());

        if body.is_none() && image_url.is_none() {
            return Err(ApiError::validation(
                "body",
                "either a message body or an image is required",
            ));
        }

        Ok((body, image_url))
    }
}

/// Message as stored and delivered
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageResponse {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub sender_role: SenderRole,
    pub sender_id: Uuid,
    pub sender_name: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_only_is_valid() {
        let req = PostMessageRequest {
            body: Some("hello".into()),
            image_url: None,
        };
        let (body, image) = req.validate().unwrap();
        assert_eq!(body.as_deref(), Some("hello"));
        assert!(image.is_none());
    }

    #[test]
    fn image_only_is_valid() {
        let req = PostMessageRequest {
            body: None,
            image_url: Some("https://cdn.example/photo.jpg".into()),
        };
        let (body, image) = req.validate().unwrap();
        assert!(body.is_none());
        assert!(image.is_some());
    }

    #[test]
    fn both_empty_is_rejected() {
        let req = PostMessageRequest {
            body: Some("   ".into()),
            image_url: Some("".into()),
        };
        assert!(req.validate().is_err());
    }
}
