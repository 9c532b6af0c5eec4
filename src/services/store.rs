//! In-memory serving cache.
//!
//! One immutable [`Snapshot`] behind an `RwLock<Arc<_>>`: readers clone the
//! `Arc` and work off a consistent view, the refresher swaps the pointer
//! wholesale after a fully-successful cycle. A failed cycle never touches
//! the stored snapshot, so stale-but-available beats empty.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{HistoricalPoint, HourlyPoint, Sensor, Statistics};

/// One complete view of the service's data, rebuilt from scratch each
/// refresh cycle. No cross-cycle accumulation: a swap fully replaces the
/// previous sensors, historical map, hourly series and statistics.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub sensors: Vec<Sensor>,
    /// Sensor id → simulated historical series.
    pub historical: HashMap<String, Vec<HistoricalPoint>>,
    /// Shared 24-hour series, sensor-independent.
    pub hourly: Vec<HourlyPoint>,
    pub statistics: Statistics,
    /// When the snapshot was built; `None` until the first successful cycle.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Shared, swappable snapshot store.
#[derive(Debug, Default)]
pub struct SensorStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SensorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current snapshot (cheap pointer clone; the returned view
    /// stays consistent even if a swap happens while it is held).
    pub async fn load(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Replace the snapshot atomically.
    pub async fn swap(&self, snapshot: Snapshot) {
        *self.current.write().await = Arc::new(snapshot);
    }
}

/// Shared store handle.
pub type SharedStore = Arc<SensorStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_empty() {
        let store = SensorStore::new();
        let snapshot = store.load().await;
        assert!(snapshot.sensors.is_empty());
        assert!(snapshot.historical.is_empty());
        assert!(snapshot.hourly.is_empty());
        assert!(snapshot.refreshed_at.is_none());
    }

    #[tokio::test]
    async fn test_swap_replaces_wholesale() {
        let store = SensorStore::new();
        let refreshed = "2026-04-08T10:00:00Z".parse().unwrap();
        store
            .swap(Snapshot {
                refreshed_at: Some(refreshed),
                ..Default::default()
            })
            .await;

        assert_eq!(store.load().await.refreshed_at, Some(refreshed));
    }

    #[tokio::test]
    async fn test_held_view_survives_swap() {
        let store = SensorStore::new();
        let t1 = "2026-04-08T10:00:00Z".parse().unwrap();
        let t2 = "2026-04-08T10:10:00Z".parse().unwrap();

        store
            .swap(Snapshot {
                refreshed_at: Some(t1),
                ..Default::default()
            })
            .await;
        let held = store.load().await;

        store
            .swap(Snapshot {
                refreshed_at: Some(t2),
                ..Default::default()
            })
            .await;

        // The older view stays intact for whoever grabbed it.
        assert_eq!(held.refreshed_at, Some(t1));
        assert_eq!(store.load().await.refreshed_at, Some(t2));
    }
}
