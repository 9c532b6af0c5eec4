//! Background refresher for the sensor snapshot.
//!
//! Runs one fetch→normalize→annotate→synthesize→swap cycle immediately at
//! startup and then on a fixed interval. Cycles are sequential by
//! construction (one loop task), so a new cycle can never race an in-flight
//! one for the snapshot swap.
//!
//! Failure containment:
//! - bulk fetch failure aborts the cycle; the previous snapshot keeps serving
//! - a malformed bulk record is skipped during normalization
//! - a failed per-sensor enrichment call drops only that sensor
//!
//! State is in-memory (`Arc<RwLock<RefresherState>>`), published after every
//! cycle and served read-only by the status endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::aqi::{aqi_category, calculate_aqi, format_pm25};
use crate::errors::UpstreamError;
use crate::models::{GeoPosition, Sensor, Statistics};
use crate::services::simpleaq::{normalize_record, NormalizedReading, SimpleAqClient};
use crate::services::store::{SensorStore, SharedStore, Snapshot};
use crate::services::synthetic;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A sensor's history is shaped around its live reading scaled by this.
const HISTORY_BASELINE_FACTOR: f64 = 0.8;

// ---------------------------------------------------------------------------
// Refresher state (in-memory, shared via Arc<RwLock<>>)
// ---------------------------------------------------------------------------

/// Global refresher state, exposed via the status endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefresherState {
    pub active: bool,
    pub next_refresh_at: Option<DateTime<Utc>>,
    pub last_refresh_completed_at: Option<DateTime<Utc>>,
    pub last_refresh_duration_ms: Option<u64>,
    pub total_refreshes: u64,
    pub failed_refreshes: u64,
    /// Sensors in the snapshot after the last successful cycle.
    pub sensor_count: usize,
    /// "pending", "ok", or "error: ..."
    pub last_result: String,
}

impl RefresherState {
    pub fn new() -> Self {
        Self {
            active: true,
            next_refresh_at: None,
            last_refresh_completed_at: None,
            last_refresh_duration_ms: None,
            total_refreshes: 0,
            failed_refreshes: 0,
            sensor_count: 0,
            last_result: "pending".to_string(),
        }
    }
}

/// Shared refresher state handle.
pub type SharedRefresherState = Arc<RwLock<RefresherState>>;

// ---------------------------------------------------------------------------
// Main refresher loop
// ---------------------------------------------------------------------------

/// Run the background refresher. This function never returns (runs until
/// process exit). Should be spawned via `tokio::spawn(run_refresher(...))`.
pub async fn run_refresher(
    client: SimpleAqClient,
    store: SharedStore,
    state: SharedRefresherState,
    interval: std::time::Duration,
) {
    tracing::info!(
        "Background refresher started (interval {}s)",
        interval.as_secs()
    );

    loop {
        let cycle_start = Utc::now();
        let result = run_refresh_cycle(&client, &store).await;
        let duration_ms = (Utc::now() - cycle_start).num_milliseconds().max(0) as u64;

        let interval_chrono = chrono::Duration::from_std(interval)
            .unwrap_or_else(|_| chrono::Duration::seconds(600));

        {
            let mut s = state.write().await;
            s.total_refreshes += 1;
            s.last_refresh_completed_at = Some(Utc::now());
            s.last_refresh_duration_ms = Some(duration_ms);
            s.next_refresh_at = Some(Utc::now() + interval_chrono);
            match &result {
                Ok(count) => {
                    s.sensor_count = *count;
                    s.last_result = "ok".to_string();
                }
                Err(e) => {
                    s.failed_refreshes += 1;
                    s.last_result = format!("error: {}", e);
                }
            }
        }

        match result {
            Ok(count) => {
                tracing::info!("Refresh cycle complete in {}ms: {} sensors", duration_ms, count);
            }
            Err(e) => {
                tracing::error!("Refresh cycle failed, serving previous snapshot: {}", e);
            }
        }

        tokio::time::sleep(interval).await;
    }
}

// ---------------------------------------------------------------------------
// Single refresh cycle
// ---------------------------------------------------------------------------

/// Execute one refresh cycle against the upstream and swap the result into
/// the store. Returns the new sensor count.
///
/// On error the store is left untouched. An empty (but successful) upstream
/// result swaps in an empty snapshot — that is a valid terminal state.
pub async fn run_refresh_cycle(
    client: &SimpleAqClient,
    store: &SensorStore,
) -> Result<usize, UpstreamError> {
    let raw = client.fetch_bulk().await?;

    let readings: Vec<NormalizedReading> = raw
        .iter()
        .filter_map(|(id, record)| normalize_record(id, record))
        .collect();

    let sensors = enrich_and_annotate(client, readings).await;

    let now = Utc::now();
    let historical = sensors
        .iter()
        .map(|sensor| {
            (
                sensor.id.clone(),
                synthetic::generate_historical(
                    synthetic::HISTORY_DAYS,
                    synthetic::HISTORY_POINTS_PER_DAY,
                    sensor.pm25 * HISTORY_BASELINE_FACTOR,
                    now,
                ),
            )
        })
        .collect();
    let hourly = synthetic::generate_hourly(now);
    let statistics = compute_statistics(&sensors);

    let count = sensors.len();
    tracing::debug!(
        "Built snapshot: {} sensors, average PM2.5 {}",
        count,
        format_pm25(statistics.average_pm25)
    );

    store
        .swap(Snapshot {
            sensors,
            historical,
            hourly,
            statistics,
            refreshed_at: Some(now),
        })
        .await;

    Ok(count)
}

/// Enrich normalized readings with each sensor's freshest recent-window
/// value, concurrently, then annotate with AQI and placeholder conditions.
///
/// A failed enrichment request drops that sensor only; an empty recent
/// window falls back to the bulk value.
async fn enrich_and_annotate(
    client: &SimpleAqClient,
    readings: Vec<NormalizedReading>,
) -> Vec<Sensor> {
    let fetches = readings.into_iter().map(|reading| async move {
        match client
            .fetch_recent_pm25(&reading.name, &reading.raw_timestamp)
            .await
        {
            Ok(recent) => {
                let pm25 = recent.unwrap_or(reading.pm25);
                Some(build_sensor(reading, pm25))
            }
            Err(e) => {
                tracing::warn!(
                    "Dropping sensor {} ({}) this cycle: {}",
                    reading.id,
                    reading.name,
                    e
                );
                None
            }
        }
    });

    futures::future::join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Assemble a [`Sensor`], deriving AQI fields from the final PM2.5 value.
fn build_sensor(reading: NormalizedReading, pm25: f64) -> Sensor {
    let (temperature, humidity, pressure) = synthetic::placeholder_conditions();
    Sensor {
        id: reading.id,
        name: reading.name,
        location: GeoPosition {
            lat: reading.latitude,
            lng: reading.longitude,
        },
        pm25,
        temperature,
        humidity,
        pressure,
        last_updated: reading.last_updated,
        aqi: calculate_aqi(pm25),
        aqi_category: aqi_category(pm25),
    }
}

/// Aggregate statistics over the sensor set. Zero-safe: an empty set yields
/// zeroed numerics and an empty distribution.
pub fn compute_statistics(sensors: &[Sensor]) -> Statistics {
    if sensors.is_empty() {
        return Statistics::default();
    }

    let sum: f64 = sensors.iter().map(|s| s.pm25).sum();
    let max = sensors.iter().map(|s| s.pm25).fold(f64::NEG_INFINITY, f64::max);
    let min = sensors.iter().map(|s| s.pm25).fold(f64::INFINITY, f64::min);

    let mut distribution = std::collections::HashMap::new();
    for sensor in sensors {
        *distribution
            .entry(sensor.aqi_category.category.clone())
            .or_insert(0) += 1;
    }

    Statistics {
        average_pm25: sum / sensors.len() as f64,
        max_pm25: max,
        min_pm25: min,
        aqi_distribution: distribution,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
