//! Estimate routes
//!
//! Pricing is pure: a breakdown is computed from the submitted configuration
//! and the current catalog snapshot, never persisted.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::estimate::{Configuration, UnitSizeBounds};
use crate::error::ApiError;
use crate::pricing;

/// POST /estimates/compute
///
/// Body: configuration fields. Returns the total plus one line item per
/// considered component, zero-priced components included.
pub async fn compute_estimate(
    State(state): State<Arc<AppState>>,
    Json(input): Json<Configuration>,
) -> Result<impl IntoResponse, ApiError> {
    let config = input.validate(UnitSizeBounds {
        min_sqm: state.settings.unit_size_min_sqm,
        max_sqm: state.settings.unit_size_max_sqm,
    })?;

    let catalog = state.rates.snapshot(&state.db).await?;
    let breakdown = pricing::compute_breakdown(&config, &catalog);

    Ok(Json(breakdown))
}
