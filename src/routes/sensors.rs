//! Sensor snapshot HTTP endpoints.
//!
//! - GET /api/sensors — current sensor list
//! - GET /api/statistics — aggregate statistics over the sensor set
//!
//! Both are pure cache reads: they never trigger an upstream fetch and an
//! empty cache serves an empty body, never an error.

use axum::extract::State;
use axum::Json;

use crate::models::{Sensor, Statistics};
use crate::services::store::SharedStore;

/// List the current sensor snapshot.
#[utoipa::path(
    get,
    path = "/api/sensors",
    tag = "Sensors",
    responses(
        (status = 200, description = "Current sensor snapshot (empty array before the first refresh)", body = Vec<Sensor>),
    )
)]
pub async fn list_sensors(State(store): State<SharedStore>) -> Json<Vec<Sensor>> {
    Json(store.load().await.sensors.clone())
}

/// Get aggregate statistics for the current sensor set.
#[utoipa::path(
    get,
    path = "/api/statistics",
    tag = "Statistics",
    responses(
        (status = 200, description = "Aggregate PM2.5 statistics and AQI category distribution", body = Statistics),
    )
)]
pub async fn get_statistics(State(store): State<SharedStore>) -> Json<Statistics> {
    Json(store.load().await.statistics.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::{SensorStore, Snapshot};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_cache_serves_empty_array() {
        let store: SharedStore = Arc::new(SensorStore::new());
        let Json(sensors) = list_sensors(State(store.clone())).await;
        assert!(sensors.is_empty());

        let Json(stats) = get_statistics(State(store)).await;
        assert_eq!(stats.average_pm25, 0.0);
        assert!(stats.aqi_distribution.is_empty());
    }

    #[tokio::test]
    async fn test_serves_swapped_statistics() {
        let store: SharedStore = Arc::new(SensorStore::new());
        store
            .swap(Snapshot {
                statistics: Statistics {
                    average_pm25: 21.5,
                    max_pm25: 40.0,
                    min_pm25: 3.0,
                    aqi_distribution: [("Moderate".to_string(), 2)].into_iter().collect(),
                },
                ..Default::default()
            })
            .await;

        let Json(stats) = get_statistics(State(store)).await;
        assert_eq!(stats.average_pm25, 21.5);
        assert_eq!(stats.aqi_distribution["Moderate"], 2);
    }
}
