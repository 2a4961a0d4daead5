//! Inquiry routes
//!
//! Submission, listing, owner edits while pending, and the lifecycle
//! transitions (accept / complete / cancel). Transitions are serialized at
//! the data layer with a conditional update on the status column: guards are
//! re-checked against the persisted row, never against caller-supplied
//! state, so concurrent admin actions cannot both win.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::{Created, DataResponse, NoContent};
use crate::app::AppState;
use crate::auth::{AuthContext, RequireAdmin, RequireAuth};
use crate::domain::estimate::UnitSizeBounds;
use crate::domain::inquiry::{
    decode_feature_ids, InquiryResponse, InquiryStatus, LifecycleEvent, SubmitInquiryRequest,
    TransitionError, UpdateInquiryRequest,
};
use crate::domain::notifications::NotificationEvent;
use crate::domain::rates::RateCatalog;
use crate::error::ApiError;

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(super) struct InquiryRow {
    pub(super) id: Uuid,
    pub(super) user_id: Uuid,
    bedrooms: i32,
    bathrooms: i32,
    floors: String,
    style: String,
    unit_size: i32,
    city: String,
    features: serde_json::Value,
    pub(super) status: InquiryStatus,
    note: Option<String>,
    image_urls: serde_json::Value,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

const INQUIRY_COLUMNS: &str = "id, user_id, bedrooms, bathrooms, floors, style, unit_size, city, \
     features, status, note, image_urls, created_at, accepted_at, completed_at";

impl InquiryRow {
    pub(super) fn into_response(self, catalog: &RateCatalog) -> InquiryResponse {
        let features = decode_feature_ids(self.id, &self.features);
        let feature_names = catalog.feature_names(&features);
        let image_urls: Vec<String> =
            serde_json::from_value(self.image_urls).unwrap_or_default();

        InquiryResponse {
            id: self.id,
            user_id: self.user_id,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            floors: self.floors,
            style: self.style,
            unit_size: self.unit_size,
            city: self.city,
            features,
            feature_names,
            status: self.status,
            note: self.note,
            image_urls,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            completed_at: self.completed_at,
        }
    }
}

async fn fetch_inquiry(state: &AppState, inquiry_id: Uuid) -> Result<InquiryRow, ApiError> {
    sqlx::query_as::<_, InquiryRow>(&format!(
        "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1"
    ))
    .bind(inquiry_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Inquiry not found"))
}

fn unit_size_bounds(state: &AppState) -> UnitSizeBounds {
    UnitSizeBounds {
        min_sqm: state.settings.unit_size_min_sqm,
        max_sqm: state.settings.unit_size_max_sqm,
    }
}

// ============================================================================
// Submission
// ============================================================================

/// POST /inquiries
///
/// Submit a validated configuration as a pending inquiry and notify the
/// contractor side.
pub async fn submit_inquiry(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(input): Json<SubmitInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let config = input.configuration.validate(unit_size_bounds(&state))?;

    // The token may outlive the account; re-check the owner exists
    let owner_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.db)
        .await?;
    if owner_exists.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let id = Uuid::new_v4();
    let features = serde_json::to_value(&config.features)
        .map_err(|e| ApiError::Internal(e.into()))?;
    let image_urls = serde_json::to_value(&input.image_urls)
        .map_err(|e| ApiError::Internal(e.into()))?;

    let row = sqlx::query_as::<_, InquiryRow>(&format!(
        r#"
        INSERT INTO inquiries
            (id, user_id, bedrooms, bathrooms, floors, style, unit_size, city,
             features, status, note, image_urls)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {INQUIRY_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(auth.user_id)
    .bind(config.bedrooms)
    .bind(config.bathrooms)
    .bind(&config.floors)
    .bind(&config.style)
    .bind(config.unit_size as i32)
    .bind(&config.city)
    .bind(&features)
    .bind(InquiryStatus::Pending)
    .bind(&input.note)
    .bind(&image_urls)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(inquiry_id = %id, user_id = %auth.user_id, "Inquiry submitted");

    state
        .notifier
        .dispatch(NotificationEvent::InquirySubmitted, id, auth.user_id);

    let catalog = state.rates.snapshot(&state.db).await?;
    Ok(Created(row.into_response(&catalog)))
}

// ============================================================================
// Listing / Reading
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct InquiryQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub status: Option<InquiryStatus>,
}

/// GET /inquiries (admin)
///
/// All inquiries, newest first, optionally filtered by status.
pub async fn list_inquiries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InquiryQueryParams>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.status.map(|s| s.to_string());

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inquiries WHERE ($1::text IS NULL OR status = $1)",
    )
    .bind(&status)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, InquiryRow>(&format!(
        r#"
        SELECT {INQUIRY_COLUMNS} FROM inquiries
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(&status)
    .bind(query.pagination.limit() as i64)
    .bind(query.pagination.offset() as i64)
    .fetch_all(&state.db)
    .await?;

    let catalog = state.rates.snapshot(&state.db).await?;
    let data: Vec<InquiryResponse> = rows
        .into_iter()
        .map(|r| r.into_response(&catalog))
        .collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

pub(super) async fn fetch_inquiries_for_user(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<InquiryRow>, ApiError> {
    Ok(sqlx::query_as::<_, InquiryRow>(&format!(
        "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&state.db)
    .await?)
}

/// GET /inquiries/mine
pub async fn list_my_inquiries(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let rows = fetch_inquiries_for_user(&state, auth.user_id).await?;

    let catalog = state.rates.snapshot(&state.db).await?;
    let data: Vec<InquiryResponse> = rows
        .into_iter()
        .map(|r| r.into_response(&catalog))
        .collect();

    Ok(DataResponse::new(data))
}

/// GET /inquiries/:id (owner or admin)
pub async fn get_inquiry(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = fetch_inquiry(&state, inquiry_id).await?;
    ensure_owner_or_admin(&auth, &row.user_id)?;

    let catalog = state.rates.snapshot(&state.db).await?;
    Ok(DataResponse::new(row.into_response(&catalog)))
}

fn ensure_owner_or_admin(auth: &AuthContext, owner_id: &Uuid) -> Result<(), ApiError> {
    if auth.role.is_admin() || auth.user_id == *owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("You do not have access to this inquiry"))
    }
}

// ============================================================================
// Owner edits while pending
// ============================================================================

/// PUT /inquiries/:id (owner, pending only)
///
/// Content fields are only editable while the inquiry has not entered the
/// contractor workflow.
pub async fn update_inquiry(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<UpdateInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = fetch_inquiry(&state, inquiry_id).await?;
    if row.user_id != auth.user_id {
        return Err(ApiError::forbidden("Only the owner may edit an inquiry"));
    }

    let config = input.configuration.validate(unit_size_bounds(&state))?;
    let features = serde_json::to_value(&config.features)
        .map_err(|e| ApiError::Internal(e.into()))?;
    let image_urls = serde_json::to_value(&input.image_urls)
        .map_err(|e| ApiError::Internal(e.into()))?;

    // Conditional update: the pending check runs against the stored row
    let updated = sqlx::query_as::<_, InquiryRow>(&format!(
        r#"
        UPDATE inquiries
        SET bedrooms = $1, bathrooms = $2, floors = $3, style = $4,
            unit_size = $5, city = $6, features = $7, note = $8, image_urls = $9
        WHERE id = $10 AND status = 'pending'
        RETURNING {INQUIRY_COLUMNS}
        "#
    ))
    .bind(config.bedrooms)
    .bind(config.bathrooms)
    .bind(&config.floors)
    .bind(&config.style)
    .bind(config.unit_size as i32)
    .bind(&config.city)
    .bind(&features)
    .bind(&input.note)
    .bind(&image_urls)
    .bind(inquiry_id)
    .fetch_optional(&state.db)
    .await?;

    match updated {
        Some(row) => {
            let catalog = state.rates.snapshot(&state.db).await?;
            Ok(DataResponse::new(row.into_response(&catalog)))
        }
        None => {
            let current = fetch_inquiry(&state, inquiry_id).await?;
            Err(ApiError::validation(
                "status",
                format!(
                    "inquiry can only be edited while pending (currently {})",
                    current.status
                ),
            ))
        }
    }
}

// ============================================================================
// Lifecycle transitions
// ============================================================================

/// PUT /inquiries/:id/accept (admin)
pub async fn accept_inquiry(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    transition(&state, inquiry_id, LifecycleEvent::Accept, &admin.0).await
}

/// PUT /inquiries/:id/complete (admin)
pub async fn complete_inquiry(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    transition(&state, inquiry_id, LifecycleEvent::Complete, &admin.0).await
}

/// PUT /inquiries/:id/cancel (owning user, pending only)
pub async fn cancel_inquiry(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    transition(&state, inquiry_id, LifecycleEvent::Cancel, &auth.0).await
}

/// Apply a lifecycle event with read-then-compare-then-write discipline.
///
/// The conditional update only succeeds when the status column still holds
/// the value the guard was checked against; a lost race re-reads and reports
/// the fresh state.
async fn transition(
    state: &Arc<AppState>,
    inquiry_id: Uuid,
    event: LifecycleEvent,
    actor: &AuthContext,
) -> Result<DataResponse<InquiryResponse>, ApiError> {
    let row = fetch_inquiry(state, inquiry_id).await?;

    // Cancellation is reserved for the owning user; accept/complete reach
    // here through the admin extractor.
    if event == LifecycleEvent::Cancel && row.user_id != actor.user_id {
        return Err(ApiError::forbidden(
            "Only the owner may cancel their inquiry",
        ));
    }

    let current = row.status;
    let next = current.apply(event)?;

    let updated = sqlx::query_as::<_, InquiryRow>(&format!(
        r#"
        UPDATE inquiries
        SET status = $1,
            accepted_at = CASE WHEN $1 = 'accepted' THEN NOW() ELSE accepted_at END,
            completed_at = CASE WHEN $1 = 'completed' THEN NOW() ELSE completed_at END
        WHERE id = $2 AND status = $3
        RETURNING {INQUIRY_COLUMNS}
        "#
    ))
    .bind(next)
    .bind(inquiry_id)
    .bind(current)
    .fetch_optional(&state.db)
    .await?;

    let row = match updated {
        Some(row) => row,
        None => {
            // Lost a race with a concurrent transition; report what actually
            // happened, not the stale guard.
            let fresh = fetch_inquiry(state, inquiry_id).await?;
            return Err(TransitionError::NotAllowed {
                current: fresh.status,
                event,
            }
            .into());
        }
    };

    tracing::info!(
        inquiry_id = %inquiry_id,
        from = %current,
        to = %next,
        actor = %actor.user_id,
        "Inquiry transitioned"
    );

    let notification = match event {
        LifecycleEvent::Accept => NotificationEvent::InquiryAccepted,
        LifecycleEvent::Complete => NotificationEvent::InquiryCompleted,
        LifecycleEvent::Cancel => NotificationEvent::InquiryCancelled,
    };
    state.notifier.dispatch(notification, inquiry_id, row.user_id);

    let catalog = state.rates.snapshot(&state.db).await?;
    Ok(DataResponse::new(row.into_response(&catalog)))
}

// ============================================================================
// Legacy purge
// ============================================================================

/// DELETE /inquiries/:id (admin)
///
/// Explicit removal of legacy records; not part of the lifecycle. Messages
/// go with the inquiry via the foreign key cascade.
pub async fn delete_inquiry(
    State(state): State<Arc<AppState>>,
    Path(inquiry_id): Path<Uuid>,
    admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
        .bind(inquiry_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Inquiry not found"));
    }

    tracing::info!(inquiry_id = %inquiry_id, admin = %admin.user_id, "Inquiry deleted");
    Ok(NoContent)
}
