use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::store::SharedStore;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" once a snapshot exists, "degraded" before the first successful refresh
    pub status: String,
    /// API version
    pub version: String,
    /// Number of sensors in the current snapshot
    pub sensors: usize,
    /// When the snapshot was last rebuilt
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// Health check endpoint.
///
/// Returns the API status and version. Reports "degraded" (still 200) until
/// the first successful refresh has populated the snapshot, so load
/// balancers can tell a cold start from a healthy instance.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(store): State<SharedStore>) -> Json<HealthResponse> {
    let snapshot = store.load().await;

    Json(HealthResponse {
        status: if snapshot.refreshed_at.is_some() {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        sensors: snapshot.sensors.len(),
        last_refreshed_at: snapshot.refreshed_at,
    })
}
