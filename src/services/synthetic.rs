//! Synthetic series generation.
//!
//! Everything produced here is simulated, not measured: plausible diurnal
//! pollution patterns shaped around one real upstream PM2.5 reading, plus
//! placeholder weather conditions for live sensors. The shape is
//! deterministic (rush-hour peaks, night lows, weekend dampening, sinusoidal
//! temperature/humidity curves); only the magnitudes carry uniform jitter.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use rand::Rng;
use std::f64::consts::PI;

use crate::aqi::calculate_aqi;
use crate::models::{HistoricalPoint, HourlyPoint};

/// Days of synthetic history generated per sensor.
pub const HISTORY_DAYS: u32 = 7;

/// Points per day in the synthetic history.
pub const HISTORY_POINTS_PER_DAY: u32 = 24;

/// Length of the shared hourly series.
const HOURLY_POINTS: i64 = 24;

/// Weekend dampening applied to the PM2.5 factor.
const WEEKEND_FACTOR: f64 = 0.85;

fn random_in_range(min: f64, max: f64) -> f64 {
    rand::thread_rng().gen_range(min..max)
}

/// Morning (07–09) and evening (16–19) traffic windows.
fn is_rush_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (16..=19).contains(&hour)
}

/// Overnight window (22:00–05:00).
fn is_night(hour: u32) -> bool {
    hour >= 22 || hour <= 5
}

/// Multiplicative PM2.5 factor for an hour of day: elevated during rush
/// hours (1.5–2.0×), reduced at night (0.7–1.0×), baseline otherwise.
fn pm25_hour_factor(hour: u32) -> f64 {
    if is_rush_hour(hour) {
        1.5 + random_in_range(0.0, 0.5)
    } else if is_night(hour) {
        0.7 + random_in_range(0.0, 0.3)
    } else {
        1.0
    }
}

/// Simulated diurnal temperature at an hour of day (°C).
fn diurnal_temperature(hour: u32) -> f64 {
    20.0 + 10.0 * (PI * hour as f64 / 12.0).sin() + random_in_range(-2.0, 2.0)
}

/// Simulated diurnal relative humidity at an hour of day (%).
fn diurnal_humidity(hour: u32) -> f64 {
    50.0 + 15.0 * (PI * hour as f64 / 12.0).cos() + random_in_range(-5.0, 5.0)
}

/// Floor a datetime to the start of its hour.
fn floor_to_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_opt(dt.time().hour(), 0, 0)
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or(dt)
}

/// Generate a sensor's simulated hourly history, ordered by time.
///
/// `baseline_pm25` anchors the magnitude (the refresher passes the sensor's
/// live reading × 0.8). Each point gets the hour-of-day factor, a weekend
/// dampening based on the point's own weekday, and a jitter factor in
/// [0.8, 1.2].
pub fn generate_historical(
    days: u32,
    points_per_day: u32,
    baseline_pm25: f64,
    now: DateTime<Utc>,
) -> Vec<HistoricalPoint> {
    let mut result = Vec::with_capacity((days * points_per_day) as usize);

    for day in 0..days {
        for point in 0..points_per_day {
            let hour = 24 * point / points_per_day;
            let date = now.date_naive() - Duration::days(day as i64);
            let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);

            let mut factor = pm25_hour_factor(hour);
            if matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun) {
                factor *= WEEKEND_FACTOR;
            }
            let jitter = random_in_range(0.8, 1.2);

            result.push(HistoricalPoint {
                timestamp,
                pm25: baseline_pm25 * factor * jitter,
                temperature: diurnal_temperature(hour),
                humidity: diurnal_humidity(hour),
            });
        }
    }

    result.sort_by_key(|p| p.timestamp);
    result
}

/// Generate the shared 24-point hourly series covering the last 24 hours.
///
/// Sensor-independent: base PM2.5 follows the same diurnal windows as the
/// historical shaping, and each point's AQI is derived from its PM2.5.
pub fn generate_hourly(now: DateTime<Utc>) -> Vec<HourlyPoint> {
    let latest = floor_to_hour(now);
    let mut data = Vec::with_capacity(HOURLY_POINTS as usize);

    for i in 0..HOURLY_POINTS {
        let time = latest - Duration::hours(HOURLY_POINTS - 1 - i);
        let hour = time.hour();

        let pm25 = if is_rush_hour(hour) {
            30.0 + random_in_range(0.0, 15.0)
        } else if is_night(hour) {
            10.0 + random_in_range(0.0, 5.0)
        } else {
            15.0 + random_in_range(0.0, 10.0)
        };

        data.push(HourlyPoint {
            time,
            pm25,
            aqi: calculate_aqi(pm25),
        });
    }

    data
}

/// Placeholder weather conditions for a live sensor: (temperature °C,
/// humidity %, pressure hPa). Upstream does not report these yet.
pub fn placeholder_conditions() -> (f64, f64, f64) {
    (
        random_in_range(18.0, 35.0),
        random_in_range(30.0, 80.0),
        random_in_range(990.0, 1030.0),
    )
}
