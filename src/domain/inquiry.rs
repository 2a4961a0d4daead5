//! Inquiry aggregate and its lifecycle state machine
//!
//! Statuses move along `pending -> accepted -> completed` or
//! `pending -> cancelled`; both `completed` and `cancelled` are terminal.
//! The transition table lives here as pure logic; persistence-level
//! serialization of concurrent transitions is handled in the routes with a
//! conditional update on the status column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::estimate::Configuration;

/// Inquiry status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InquiryStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InquiryStatus::Pending => write!(f, "pending"),
            InquiryStatus::Accepted => write!(f, "accepted"),
            InquiryStatus::Completed => write!(f, "completed"),
            InquiryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Lifecycle event applied to a persisted inquiry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Accept,
    Complete,
    Cancel,
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleEvent::Accept => write!(f, "accept"),
            LifecycleEvent::Complete => write!(f, "complete"),
            LifecycleEvent::Cancel => write!(f, "cancel"),
        }
    }
}

/// A rejected lifecycle transition, carrying the persisted state and the
/// attempted event so callers can render an accurate message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot cancel an accepted inquiry")]
    CancelAccepted,

    #[error("cannot {event} an inquiry that is {current}")]
    NotAllowed {
        current: InquiryStatus,
        event: LifecycleEvent,
    },
}

impl TransitionError {
    pub fn current(&self) -> InquiryStatus {
        match self {
            TransitionError::CancelAccepted => InquiryStatus::Accepted,
            TransitionError::NotAllowed { current, .. } => *current,
        }
    }
}

impl InquiryStatus {
    /// Apply a lifecycle event, returning the next status.
    ///
    /// Terminal states reject every event; an accepted inquiry cannot be
    /// cancelled.
    pub fn apply(self, event: LifecycleEvent) -> Result<InquiryStatus, TransitionError> {
        use InquiryStatus::*;
        use LifecycleEvent::*;

        match (self, event) {
            (Pending, Accept) => Ok(Accepted),
            (Pending, Cancel) => Ok(Cancelled),
            (Accepted, Complete) => Ok(Completed),
            (Accepted, Cancel) => Err(TransitionError::CancelAccepted),
            (current, event) => Err(TransitionError::NotAllowed { current, event }),
        }
    }

    /// Chat is only open once the contractor has accepted
    pub fn messaging_allowed(&self) -> bool {
        matches!(self, InquiryStatus::Accepted | InquiryStatus::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InquiryStatus::Completed | InquiryStatus::Cancelled)
    }
}

/// Request body for submitting a configuration as an inquiry
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitInquiryRequest {
    #[serde(flatten)]
    pub configuration: Configuration,

    /// Optional free-text note to the contractor
    pub note: Option<String>,

    /// Optional attached image references (opaque URLs)
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Content fields the owner may edit while the inquiry is still pending
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInquiryRequest {
    #[serde(flatten)]
    pub configuration: Configuration,
    pub note: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Inquiry as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct InquiryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub floors: String,
    pub style: String,
    pub unit_size: i32,
    pub city: String,
    pub features: Vec<i64>,
    pub feature_names: Vec<String>,
    pub status: InquiryStatus,
    pub note: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Decode a stored feature blob into a typed id list.
///
/// Legacy rows hold loosely-typed JSON; anything that is not an array of
/// integers is logged and treated as empty rather than failing the read.
pub fn decode_feature_ids(inquiry_id: Uuid, value: &serde_json::Value) -> Vec<i64> {
    match value {
        serde_json::Value::Array(items) => {
            let ids: Option<Vec<i64>> = items.iter().map(|v| v.as_i64()).collect();
            match ids {
                Some(ids) => ids,
                None => {
                    tracing::warn!(
                        inquiry_id = %inquiry_id,
                        "Inquiry has a malformed feature array, treating as empty"
                    );
                    Vec::new()
                }
            }
        }
        serde_json::Value::Null => Vec::new(),
        _ => {
            tracing::warn!(
                inquiry_id = %inquiry_id,
                "Inquiry feature blob is not an array, treating as empty"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InquiryStatus::*;
    use LifecycleEvent::*;

    #[test]
    fn happy_path_to_completed() {
        let status = Pending.apply(Accept).unwrap();
        assert_eq!(status, Accepted);
        let status = status.apply(Complete).unwrap();
        assert_eq!(status, Completed);
    }

    #[test]
    fn pending_can_be_cancelled() {
        assert_eq!(Pending.apply(Cancel).unwrap(), Cancelled);
    }

    #[test]
    fn accepted_cannot_be_cancelled() {
        let err = Accepted.apply(Cancel).unwrap_err();
        assert_eq!(err, TransitionError::CancelAccepted);
        assert_eq!(err.current(), Accepted);
    }

    #[test]
    fn terminal_states_reject_everything() {
        for terminal in [Completed, Cancelled] {
            for event in [Accept, Complete, Cancel] {
                let err = terminal.apply(event).unwrap_err();
                assert_eq!(
                    err,
                    TransitionError::NotAllowed {
                        current: terminal,
                        event
                    }
                );
            }
        }
    }

    #[test]
    fn accept_is_not_idempotent() {
        let err = Accepted.apply(Accept).unwrap_err();
        assert_eq!(err.current(), Accepted);
    }

    #[test]
    fn messaging_eligibility_follows_status() {
        assert!(!Pending.messaging_allowed());
        assert!(Accepted.messaging_allowed());
        assert!(Completed.messaging_allowed());
        assert!(!Cancelled.messaging_allowed());
    }

    #[test]
    fn feature_blob_decoding_is_fail_soft() {
        let id = Uuid::new_v4();
        assert_eq!(
            decode_feature_ids(id, &serde_json::json!([1, 2, 3])),
            vec![1, 2, 3]
        );
        assert!(decode_feature_ids(id, &serde_json::json!(null)).is_empty());
        assert!(decode_feature_ids(id, &serde_json::json!("oops")).is_empty());
        assert!(decode_feature_ids(id, &serde_json::json!([1, "two"])).is_empty());
    }
}
