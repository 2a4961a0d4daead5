//! Notification domain types
//!
//! In-app notices produced by inquiry lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle event a notification was produced by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    InquirySubmitted,
    InquiryAccepted,
    InquiryCompleted,
    InquiryCancelled,
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationEvent::InquirySubmitted => write!(f, "inquiry_submitted"),
            NotificationEvent::InquiryAccepted => write!(f, "inquiry_accepted"),
            NotificationEvent::InquiryCompleted => write!(f, "inquiry_completed"),
            NotificationEvent::InquiryCancelled => write!(f, "inquiry_cancelled"),
        }
    }
}

/// Notification entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event: String,
    pub title: String,
    pub message: Option<String>,
    pub data: sqlx::types::Json<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Response DTO for a notification
#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub event: String,
    pub title: String,
    pub message: Option<String>,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            event: n.event,
            title: n.title,
            message: n.message,
            data: n.data.0,
            is_read: n.is_read,
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

/// Mark notifications as read request
#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadRequest {
    /// Specific ids, or everything unread when absent
    #[serde(default)]
    pub notification_ids: Option<Vec<Uuid>>,
}
