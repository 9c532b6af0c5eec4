//! Historical and hourly series HTTP endpoints.
//!
//! - GET /api/historical?sensor_id=&time_range=24h|7d|30d&metric=pm25|temperature|humidity
//! - GET /api/hourly?metric=pm25|aqi
//!
//! Both series are synthetic (see `services::synthetic`). Query parameters
//! never fail a request: unknown `time_range`/`metric` values fall back to
//! `24h`/`pm25`, an unknown `sensor_id` yields an empty map.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

use crate::models::{HistoricalPoint, HourlyPoint, MetricPoint};
use crate::services::store::SharedStore;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoricalQuery {
    /// Restrict the response to one sensor id
    pub sensor_id: Option<String>,
    /// Window and granularity: "24h" (default), "7d", or "30d"
    pub time_range: Option<String>,
    /// Project points down to one metric: "pm25", "temperature", or "humidity"
    pub metric: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HourlyQuery {
    /// Accepted for interface compatibility; the hourly series is shared
    /// across sensors, so this parameter has no effect.
    pub sensor_id: Option<String>,
    /// Project points down to one metric: "pm25" or "aqi"
    pub metric: Option<String>,
}

// ---------------------------------------------------------------------------
// Time-range selection and downsampling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeRange {
    H24,
    D7,
    D30,
}

impl TimeRange {
    /// Unknown values fall back to 24h rather than failing the request.
    fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            None | Some("24h") => TimeRange::H24,
            Some("7d") => TimeRange::D7,
            Some("30d") => TimeRange::D30,
            Some(other) => {
                tracing::debug!("Unknown time_range '{}', defaulting to 24h", other);
                TimeRange::H24
            }
        }
    }

    /// Keep every Nth point of the hourly-granularity series.
    fn step(self) -> usize {
        match self {
            TimeRange::H24 => 1,
            TimeRange::D7 => 6,
            TimeRange::D30 => 24,
        }
    }
}

/// Reduce an hourly series to what the requested range needs: 24h keeps
/// only the last day at full granularity, wider ranges thin the series out.
fn downsample(points: &[HistoricalPoint], range: TimeRange, now: DateTime<Utc>) -> Vec<HistoricalPoint> {
    match range {
        TimeRange::H24 => {
            let cutoff = now - Duration::hours(24);
            points
                .iter()
                .filter(|p| p.timestamp >= cutoff)
                .cloned()
                .collect()
        }
        _ => points.iter().step_by(range.step()).cloned().collect(),
    }
}

// ---------------------------------------------------------------------------
// Metric projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum HistoricalMetric {
    Pm25,
    Temperature,
    Humidity,
}

impl HistoricalMetric {
    fn parse_or_default(raw: &str) -> Self {
        match raw {
            "pm25" => HistoricalMetric::Pm25,
            "temperature" => HistoricalMetric::Temperature,
            "humidity" => HistoricalMetric::Humidity,
            other => {
                tracing::debug!("Unknown historical metric '{}', defaulting to pm25", other);
                HistoricalMetric::Pm25
            }
        }
    }

    fn project(self, point: &HistoricalPoint) -> MetricPoint {
        MetricPoint {
            timestamp: point.timestamp,
            value: match self {
                HistoricalMetric::Pm25 => point.pm25,
                HistoricalMetric::Temperature => point.temperature,
                HistoricalMetric::Humidity => point.humidity,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HourlyMetric {
    Pm25,
    Aqi,
}

impl HourlyMetric {
    fn parse_or_default(raw: &str) -> Self {
        match raw {
            "pm25" => HourlyMetric::Pm25,
            "aqi" => HourlyMetric::Aqi,
            other => {
                tracing::debug!("Unknown hourly metric '{}', defaulting to pm25", other);
                HourlyMetric::Pm25
            }
        }
    }

    fn project(self, point: &HourlyPoint) -> MetricPoint {
        MetricPoint {
            timestamp: point.time,
            value: match self {
                HourlyMetric::Pm25 => point.pm25,
                HourlyMetric::Aqi => point.aqi as f64,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Full historical points, or single projected values when `metric` is given.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum HistoricalSeries {
    Full(Vec<HistoricalPoint>),
    Projected(Vec<MetricPoint>),
}

/// Full hourly points, or single projected values when `metric` is given.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum HourlySeries {
    Full(Vec<HourlyPoint>),
    Projected(Vec<MetricPoint>),
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Get the simulated historical series per sensor.
///
/// Returns a map of sensor id → series. The series are regenerated around
/// each sensor's live reading every refresh; they approximate plausible
/// diurnal patterns and are not measured values.
#[utoipa::path(
    get,
    path = "/api/historical",
    tag = "Series",
    params(HistoricalQuery),
    responses(
        (status = 200, description = "Map of sensor id to simulated historical series \
            (empty object before the first refresh or for an unknown sensor_id)", body = Object),
    )
)]
pub async fn get_historical(
    State(store): State<SharedStore>,
    Query(params): Query<HistoricalQuery>,
) -> Json<HashMap<String, HistoricalSeries>> {
    let snapshot = store.load().await;
    let range = TimeRange::parse_or_default(params.time_range.as_deref());
    let metric = params.metric.as_deref().map(HistoricalMetric::parse_or_default);
    let now = Utc::now();

    let series: HashMap<String, HistoricalSeries> = snapshot
        .historical
        .iter()
        .filter(|(id, _)| {
            params
                .sensor_id
                .as_deref()
                .map_or(true, |want| id.as_str() == want)
        })
        .map(|(id, points)| {
            let points = downsample(points, range, now);
            let series = match metric {
                Some(m) => HistoricalSeries::Projected(points.iter().map(|p| m.project(p)).collect()),
                None => HistoricalSeries::Full(points),
            };
            (id.clone(), series)
        })
        .collect();

    Json(series)
}

/// Get the shared 24-hour series.
///
/// One simulated diurnal pattern for the whole network, 24 points covering
/// the last 24 hours.
#[utoipa::path(
    get,
    path = "/api/hourly",
    tag = "Series",
    params(HourlyQuery),
    responses(
        (status = 200, description = "Shared simulated 24-hour series \
            (empty array before the first refresh)", body = HourlySeries),
    )
)]
pub async fn get_hourly(
    State(store): State<SharedStore>,
    Query(params): Query<HourlyQuery>,
) -> Json<HourlySeries> {
    let snapshot = store.load().await;

    if let Some(id) = params.sensor_id.as_deref() {
        tracing::debug!("sensor_id '{}' ignored: the hourly series is shared", id);
    }

    let series = match params.metric.as_deref().map(HourlyMetric::parse_or_default) {
        Some(m) => HourlySeries::Projected(snapshot.hourly.iter().map(|p| m.project(p)).collect()),
        None => HourlySeries::Full(snapshot.hourly.clone()),
    };

    Json(series)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
