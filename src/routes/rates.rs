//! Rate catalog routes

use axum::{extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::error::ApiError;

/// GET /rates
///
/// Full rate catalog snapshot: floor/bedroom/bathroom/style/feature unit
/// prices and per-city rates. Served from the short-TTL cache.
pub async fn get_rates(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.rates.snapshot(&state.db).await?;
    Ok(DataResponse::new(catalog.as_ref().clone()))
}
