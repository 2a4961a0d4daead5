//! Inbox route
//!
//! The client-facing conversation view: the caller's inquiries, each with
//! its message log. Inquiries that have not been accepted yet carry an empty
//! log since their channel has not opened.

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::inquiry::InquiryResponse;
use crate::domain::messages::MessageResponse;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct InboxEntry {
    #[serde(flatten)]
    pub inquiry: InquiryResponse,
    pub messages: Vec<MessageResponse>,
}

/// GET /inbox
pub async fn get_inbox(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let rows = super::inquiries::fetch_inquiries_for_user(&state, auth.user_id).await?;
    let catalog = state.rates.snapshot(&state.db).await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let messages = if row.status.messaging_allowed() {
            sqlx::query_as::<_, MessageResponse>(
                r#"
                SELECT m.id, m.inquiry_id, m.sender_role, m.sender_id,
                       u.name AS sender_name, m.body, m.image_url, m.created_at
                FROM messages m
                LEFT JOIN users u ON u.id = m.sender_id
                WHERE m.inquiry_id = $1
                ORDER BY m.created_at ASC, m.seq ASC
                "#,
            )
            .bind(row.id)
            .fetch_all(&state.db)
            .await?
        } else {
            Vec::new()
        };

        entries.push(InboxEntry {
            inquiry: row.into_response(&catalog),
            messages,
        });
    }

    Ok(DataResponse::new(entries))
}
