//! Refresher status HTTP endpoint.
//!
//! GET /api/refresher/status — returns the current state of the background
//! snapshot refresher as JSON.

use axum::extract::State;
use axum::Json;

use crate::services::refresher::{RefresherState, SharedRefresherState};

/// Get the current refresher status.
///
/// Returns cycle counters (total/failed refreshes), timing info
/// (last_refresh_completed_at, last_refresh_duration_ms, next_refresh_at)
/// and the sensor count from the last successful cycle.
#[utoipa::path(
    get,
    path = "/api/refresher/status",
    tag = "Refresher",
    responses(
        (status = 200, description = "Current refresher status", body = RefresherState),
    )
)]
pub async fn get_refresher_status(
    State(state): State<SharedRefresherState>,
) -> Json<RefresherState> {
    let s = state.read().await;
    Json(s.clone())
}
