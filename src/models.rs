//! Wire-level data model served by the read endpoints.
//!
//! Field names are pinned (camelCase, `averagePM25`, …) because existing
//! dashboard/map consumers bind to them; serde renames keep the Rust side
//! idiomatic.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::aqi::AqiCategory;

/// Geographic position of a sensor.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeoPosition {
    /// Latitude (WGS84)
    pub lat: f64,
    /// Longitude (WGS84)
    pub lng: f64,
}

/// One monitoring device's current state.
///
/// `pm25` and `last_updated` come from the upstream network; temperature,
/// humidity and pressure are synthesized placeholders until upstream
/// supplies them. `aqi`/`aqi_category` are always derived from `pm25` at
/// annotation time, never carried over.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Upstream-assigned stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub location: GeoPosition,
    /// PM2.5 concentration in µg/m³
    pub pm25: f64,
    /// Temperature in °C (simulated)
    pub temperature: f64,
    /// Relative humidity in % (simulated)
    pub humidity: f64,
    /// Barometric pressure in hPa (simulated)
    pub pressure: f64,
    /// Upstream-reported time of the last reading
    pub last_updated: DateTime<Utc>,
    /// Derived AQI (0–500)
    pub aqi: u16,
    pub aqi_category: AqiCategory,
}

/// One point of a sensor's synthetic historical series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoricalPoint {
    pub timestamp: DateTime<Utc>,
    /// PM2.5 in µg/m³ (simulated around the sensor's live reading)
    pub pm25: f64,
    /// Temperature in °C (simulated diurnal curve)
    pub temperature: f64,
    /// Relative humidity in % (simulated diurnal curve)
    pub humidity: f64,
}

/// One point of the shared 24-hour series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    /// PM2.5 in µg/m³ (simulated diurnal pattern)
    pub pm25: f64,
    /// AQI derived from `pm25`
    pub aqi: u16,
}

/// A series point projected down to a single requested metric.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Aggregate statistics over the current sensor set.
///
/// Fully recomputed each refresh. Over an empty sensor set all numeric
/// fields are 0.0 and the distribution is empty.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Statistics {
    /// Mean PM2.5 across sensors in µg/m³
    #[serde(rename = "averagePM25")]
    pub average_pm25: f64,
    /// Highest PM2.5 across sensors in µg/m³
    #[serde(rename = "maxPM25")]
    pub max_pm25: f64,
    /// Lowest PM2.5 across sensors in µg/m³
    #[serde(rename = "minPM25")]
    pub min_pm25: f64,
    /// Sensor count per AQI category label
    #[serde(rename = "aqiDistribution")]
    pub aqi_distribution: HashMap<String, usize>,
}
