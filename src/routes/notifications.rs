//! Notification routes
//!
//! Read side of the dispatcher: list own notifications and mark them read.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::MessageResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::notifications::{MarkReadRequest, Notification, NotificationResponse};
use crate::error::ApiError;

/// GET /notifications
///
/// Current user's notifications, unread first, newest within each group.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
        .bind(auth.user_id)
        .fetch_one(&state.db)
        .await?;

    let rows = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, event, title, message, data, is_read, read_at, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY is_read ASC, created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(auth.user_id)
    .bind(pagination.limit() as i64)
    .bind(pagination.offset() as i64)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<NotificationResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &pagination, total as u64))
}

/// PUT /notifications/read
///
/// Mark specific notifications read, or everything unread when no ids given.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(input): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = match input.notification_ids {
        Some(ids) if !ids.is_empty() => {
            sqlx::query(
                r#"
                UPDATE notifications
                SET is_read = TRUE, read_at = NOW()
                WHERE user_id = $1 AND id = ANY($2) AND is_read = FALSE
                "#,
            )
            .bind(auth.user_id)
            .bind(&ids)
            .execute(&state.db)
            .await?
        }
        _ => {
            sqlx::query(
                r#"
                UPDATE notifications
                SET is_read = TRUE, read_at = NOW()
                WHERE user_id = $1 AND is_read = FALSE
                "#,
            )
            .bind(auth.user_id)
            .execute(&state.db)
            .await?
        }
    };

    Ok(MessageResponse::new(format!(
        "{} notifications marked read",
        updated.rows_affected()
    )))
}
