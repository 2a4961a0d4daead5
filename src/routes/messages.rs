//! Messaging channel routes
//!
//! Per-inquiry chat: ordered log, post, and an SSE subscription for live
//! delivery. Every entry point re-checks that the inquiry is in a
//! messaging-eligible status (accepted or completed); the store itself does
//! not enforce this.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    Json,
};
use futures::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::api::response::{Created, DataResponse};
use crate::app::AppState;
use crate::auth::{AuthContext, RequireAuth, Role};
use crate::domain::inquiry::InquiryStatus;
use crate::domain::messages::{MessageResponse, PostMessageRequest, SenderRole};
use crate::error::ApiError;
use crate::services::{MessageEvent, Subscription};

/// Load the inquiry, check access, and enforce messaging eligibility
async fn ensure_messaging_eligible(
    state: &AppState,
    inquiry_id: Uuid,
    auth: &AuthContext,
) -> Result<(), ApiError> {
    let row: Option<(Uuid, InquiryStatus)> =
        sqlx::query_as("SELECT user_id, status FROM inquiries WHERE id = $1")
            .bind(inquiry_id)
            .fetch_optional(&state.db)
            .await?;

    let (owner_id, status) = row.ok_or_else(|| ApiError::not_found("Inquiry not found"))?;

    if !auth.role.is_admin() && auth.user_id != owner_id {
        return Err(ApiError::forbidden("You do not have access to this inquiry"));
    }

    if !status.messaging_allowed() {
        return Err(ApiError::messaging_not_allowed(format!(
            "inquiry is {status}; messaging opens once the inquiry is accepted"
        )));
    }

    Ok(())
}

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.inquiry_id, m.sender_role, m.sender_id, u.name AS sender_name,
           m.body, m.image_url, m.created_at
    FROM messages m
    LEFT JOIN users u ON u.id = m.sender_id
"#;

/// GET /inquiries/:id/messages
///
/// The full ordered log: creation time, insertion order on ties.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    ensure_messaging_eligible(&state, inquiry_id, &auth).await?;

    let messages = sqlx::query_as::<_, MessageResponse>(&format!(
        "{MESSAGE_SELECT} WHERE m.inquiry_id = $1 ORDER BY m.created_at ASC, m.seq ASC"
    ))
    .bind(inquiry_id)
    .fetch_all(&state.db)
    .await?;

    Ok(DataResponse::new(messages))
}

/// POST /inquiries/:id/messages
///
/// Append a message (text and/or image reference) and broadcast it to the
/// inquiry's live subscribers.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_messaging_eligible(&state, inquiry_id, &auth).await?;

    let (body, image_url) = input.validate()?;
    let sender_role = match auth.role {
        Role::Admin => SenderRole::Admin,
        Role::User => SenderRole::User,
    };

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO messages (id, inquiry_id, sender_role, sender_id, body, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(inquiry_id)
    .bind(sender_role)
    .bind(auth.user_id)
    .bind(&body)
    .bind(&image_url)
    .execute(&state.db)
    .await?;

    // Read the stored row back so the broadcast carries the authoritative
    // timestamp and resolved sender name
    let message = sqlx::query_as::<_, MessageResponse>(&format!(
        "{MESSAGE_SELECT} WHERE m.id = $1"
    ))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    state.realtime.publish(
        inquiry_id,
        MessageEvent {
            message: message.clone(),
        },
    );

    tracing::debug!(
        inquiry_id = %inquiry_id,
        message_id = %id,
        sender_role = %sender_role,
        "Message posted"
    );

    Ok(Created(message))
}

/// GET /inquiries/:id/messages/stream
///
/// SSE subscription scoped to one inquiry. Emits a `new-message` event per
/// successful post. Delivery to a disconnected subscriber is dropped, not
/// queued; clients re-fetch the log on reconnect.
pub async fn stream_messages(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    ensure_messaging_eligible(&state, inquiry_id, &auth).await?;

    let Subscription { receiver, guard } = state.realtime.subscribe(inquiry_id);

    let stream = BroadcastStream::new(receiver).filter_map(move |result| {
        // Keeps the channel membership alive for as long as the stream is
        let _guard = &guard;
        match result {
            Ok(event) => Event::default()
                .event("new-message")
                .json_data(&event.message)
                .ok()
                .map(Ok::<_, Infallible>),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(
                    inquiry_id = %inquiry_id,
                    skipped,
                    "Slow message subscriber lagged; client should re-fetch the log"
                );
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
