//! SimpleAQ sensor-network client.
//!
//! Fetches raw PM2.5 readings from the SimpleAQ API: one bulk query for the
//! whole network plus a per-sensor recent-window query for the latest value.
//! Upstream field names stop at this module's normalization boundary — the
//! rest of the service only sees [`NormalizedReading`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::UpstreamError;

/// Field identifier for PM2.5 in the bulk query.
const BULK_FIELD: &str = "pm2.5";

/// Field identifier for PM2.5 in graph-data queries.
const GRAPH_FIELD: &str = "pm2.5_ug_m3";

/// Recent-window size for the per-sensor latest-value query (hours).
const GRAPH_RANGE_HOURS: u32 = 1;

/// Client for the SimpleAQ API.
#[derive(Debug, Clone)]
pub struct SimpleAqClient {
    client: reqwest::Client,
    base_url: String,
}

// --- SimpleAQ JSON response types ---

/// An upstream scalar that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Null,
}

impl RawValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Float(v) => Some(*v),
            RawValue::Integer(v) => Some(*v as f64),
            RawValue::Text(s) => s.trim().parse().ok(),
            RawValue::Null => None,
        }
    }
}

/// One record of the bulk response, keyed by sensor id.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSensorRecord {
    pub name: Option<String>,
    pub latitude: Option<RawValue>,
    pub longitude: Option<RawValue>,
    pub timestamp: Option<String>,
    pub value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<Vec<GraphPoint>>,
}

#[derive(Debug, Deserialize)]
struct GraphPoint {
    value: Option<RawValue>,
}

/// A sensor reading normalized out of the upstream schema.
#[derive(Debug, Clone)]
pub struct NormalizedReading {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Upstream-reported time of the reading.
    pub last_updated: DateTime<Utc>,
    /// The timestamp exactly as upstream reported it, echoed back in
    /// graph-data queries.
    pub raw_timestamp: String,
    /// PM2.5 from the bulk query, in µg/m³.
    pub pm25: f64,
}

impl SimpleAqClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current PM2.5 readings for the whole network.
    pub async fn fetch_bulk(&self) -> Result<HashMap<String, RawSensorRecord>, UpstreamError> {
        let url = format!("{}/api/getdata", self.base_url);
        let epoch_ms = Utc::now().timestamp_millis().to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("field", BULK_FIELD),
                ("min_lat", "-90"),
                ("max_lat", "90"),
                ("min_lon", "-180"),
                ("max_lon", "180"),
                ("utc_epoch", epoch_ms.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(format!("bulk response: {}", e)))
    }

    /// Fetch the newest PM2.5 value from a sensor's recent-window graph data.
    ///
    /// Returns `Ok(None)` when the window is empty or the newest value is
    /// unparsable — the caller falls back to the bulk value. A failed
    /// request is an error so the caller can drop the sensor.
    pub async fn fetch_recent_pm25(
        &self,
        name: &str,
        timestamp: &str,
    ) -> Result<Option<f64>, UpstreamError> {
        let url = format!("{}/api/getgraphdata", self.base_url);
        let range_hours = GRAPH_RANGE_HOURS.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("id", name),
                ("field", GRAPH_FIELD),
                ("rangehours", range_hours.as_str()),
                ("time", timestamp),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let graph: GraphResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(format!("graph response: {}", e)))?;

        Ok(graph
            .data
            .and_then(|points| points.into_iter().last())
            .and_then(|point| point.value)
            .and_then(|value| value.as_f64()))
    }
}

/// Normalize one bulk record into a [`NormalizedReading`].
///
/// Records missing a required field (name, coordinates, timestamp, value)
/// or carrying unparsable values are skipped with a warning — one bad
/// record never aborts the cycle.
pub fn normalize_record(id: &str, record: &RawSensorRecord) -> Option<NormalizedReading> {
    let name = match &record.name {
        Some(n) if !n.is_empty() => n.clone(),
        _ => {
            tracing::warn!("Skipping sensor {}: missing name", id);
            return None;
        }
    };

    let latitude = match record.latitude.as_ref().and_then(RawValue::as_f64) {
        Some(v) => v,
        None => {
            tracing::warn!("Skipping sensor {} ({}): missing or unparsable latitude", id, name);
            return None;
        }
    };

    let longitude = match record.longitude.as_ref().and_then(RawValue::as_f64) {
        Some(v) => v,
        None => {
            tracing::warn!("Skipping sensor {} ({}): missing or unparsable longitude", id, name);
            return None;
        }
    };

    let raw_timestamp = match &record.timestamp {
        Some(t) if !t.is_empty() => t.clone(),
        _ => {
            tracing::warn!("Skipping sensor {} ({}): missing timestamp", id, name);
            return None;
        }
    };

    let last_updated = match DateTime::parse_from_rfc3339(&raw_timestamp) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(
                "Skipping sensor {} ({}): unparsable timestamp '{}': {}",
                id,
                name,
                raw_timestamp,
                e
            );
            return None;
        }
    };

    let pm25 = match record.value.as_ref().and_then(RawValue::as_f64) {
        Some(v) if v >= 0.0 => v,
        _ => {
            tracing::warn!("Skipping sensor {} ({}): missing or invalid PM2.5 value", id, name);
            return None;
        }
    };

    Some(NormalizedReading {
        id: id.to_string(),
        name,
        latitude,
        longitude,
        last_updated,
        raw_timestamp,
        pm25,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(value: serde_json::Value) -> RawSensorRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_raw_value_accepts_numbers_and_strings() {
        assert_eq!(RawValue::Float(4.2).as_f64(), Some(4.2));
        assert_eq!(RawValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(RawValue::Text("12.5".to_string()).as_f64(), Some(12.5));
        assert_eq!(RawValue::Text("n/a".to_string()).as_f64(), None);
        assert_eq!(RawValue::Null.as_f64(), None);
    }

    #[test]
    fn test_normalize_record_full() {
        let rec = record(json!({
            "name": "station-7",
            "latitude": "47.3769",
            "longitude": 8.5417,
            "timestamp": "2026-04-06T10:00:00Z",
            "value": "14.2"
        }));

        let reading = normalize_record("s7", &rec).unwrap();
        assert_eq!(reading.id, "s7");
        assert_eq!(reading.name, "station-7");
        assert!((reading.latitude - 47.3769).abs() < 1e-9);
        assert!((reading.longitude - 8.5417).abs() < 1e-9);
        assert_eq!(reading.pm25, 14.2);
        assert_eq!(
            reading.last_updated,
            "2026-04-06T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_normalize_record_missing_name() {
        let rec = record(json!({
            "latitude": "47.0",
            "longitude": "8.0",
            "timestamp": "2026-04-06T10:00:00Z",
            "value": 10.0
        }));
        assert!(normalize_record("s1", &rec).is_none());
    }

    #[test]
    fn test_normalize_record_unparsable_latitude() {
        let rec = record(json!({
            "name": "station-1",
            "latitude": "north-ish",
            "longitude": "8.0",
            "timestamp": "2026-04-06T10:00:00Z",
            "value": 10.0
        }));
        assert!(normalize_record("s1", &rec).is_none());
    }

    #[test]
    fn test_normalize_record_bad_timestamp() {
        let rec = record(json!({
            "name": "station-1",
            "latitude": 47.0,
            "longitude": 8.0,
            "timestamp": "yesterday",
            "value": 10.0
        }));
        assert!(normalize_record("s1", &rec).is_none());
    }

    #[test]
    fn test_normalize_record_negative_value() {
        let rec = record(json!({
            "name": "station-1",
            "latitude": 47.0,
            "longitude": 8.0,
            "timestamp": "2026-04-06T10:00:00Z",
            "value": -3.0
        }));
        assert!(normalize_record("s1", &rec).is_none());
    }

    #[tokio::test]
    async fn test_fetch_bulk_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getdata"))
            .and(query_param("field", "pm2.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "a1": {
                    "name": "alpha",
                    "latitude": "47.0",
                    "longitude": "8.0",
                    "timestamp": "2026-04-06T10:00:00Z",
                    "value": 11.5
                },
                "b2": {
                    "name": "beta",
                    "latitude": 46.9,
                    "longitude": 7.4,
                    "timestamp": "2026-04-06T10:05:00Z",
                    "value": "22.0"
                }
            })))
            .mount(&server)
            .await;

        let client = SimpleAqClient::new(&server.uri(), Duration::from_secs(5));
        let records = client.fetch_bulk().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records["a1"].name.as_deref(), Some("alpha"));
        assert_eq!(
            records["b2"].value.as_ref().and_then(RawValue::as_f64),
            Some(22.0)
        );
    }

    #[tokio::test]
    async fn test_fetch_bulk_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getdata"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = SimpleAqClient::new(&server.uri(), Duration::from_secs(5));
        let err = client.fetch_bulk().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_fetch_recent_pm25_takes_newest_point() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getgraphdata"))
            .and(query_param("id", "alpha"))
            .and(query_param("field", "pm2.5_ug_m3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "value": "9.0" },
                    { "value": "9.6" },
                    { "value": 10.4 }
                ]
            })))
            .mount(&server)
            .await;

        let client = SimpleAqClient::new(&server.uri(), Duration::from_secs(5));
        let value = client
            .fetch_recent_pm25("alpha", "2026-04-06T10:00:00Z")
            .await
            .unwrap();
        assert_eq!(value, Some(10.4));
    }

    #[tokio::test]
    async fn test_fetch_recent_pm25_empty_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getgraphdata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let client = SimpleAqClient::new(&server.uri(), Duration::from_secs(5));
        let value = client
            .fetch_recent_pm25("alpha", "2026-04-06T10:00:00Z")
            .await
            .unwrap();
        assert_eq!(value, None);
    }
}
