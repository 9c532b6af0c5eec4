//! Air Quality Index calculation from PM2.5 concentrations.
//!
//! Uses the EPA PM2.5 breakpoint tiers with piecewise-linear interpolation.
//! NOTE: each tier maps to a uniform 50-point AQI sub-range (tier 0 → 0–50,
//! tier 1 → 50–100, …), giving a nominal ceiling of 300 before the final
//! clamp to 500. The official EPA scale uses non-uniform sub-ranges; this
//! simplified mapping is kept for compatibility with existing consumers.

use serde::Serialize;
use utoipa::ToSchema;

/// One PM2.5 breakpoint tier.
#[derive(Debug, Clone, Copy)]
pub struct AqiBreakpoint {
    /// Lower bound of the PM2.5 range (µg/m³), inclusive.
    pub min: f64,
    /// Upper bound of the PM2.5 range (µg/m³), inclusive.
    pub max: f64,
    pub category: &'static str,
    /// Display color (hex).
    pub color: &'static str,
}

/// AQI breakpoints for PM2.5 (in µg/m³), least to most severe.
pub const AQI_BREAKPOINTS: [AqiBreakpoint; 6] = [
    AqiBreakpoint {
        min: 0.0,
        max: 12.0,
        category: "Good",
        color: "#4ade80",
    },
    AqiBreakpoint {
        min: 12.1,
        max: 35.4,
        category: "Moderate",
        color: "#facc15",
    },
    AqiBreakpoint {
        min: 35.5,
        max: 55.4,
        category: "Unhealthy for Sensitive Groups",
        color: "#fb923c",
    },
    AqiBreakpoint {
        min: 55.5,
        max: 150.4,
        category: "Unhealthy",
        color: "#f87171",
    },
    AqiBreakpoint {
        min: 150.5,
        max: 250.4,
        category: "Very Unhealthy",
        color: "#c084fc",
    },
    AqiBreakpoint {
        min: 250.5,
        max: 500.0,
        category: "Hazardous",
        color: "#ef4444",
    },
];

/// Maximum AQI value (concentrations above the last tier clamp here).
const AQI_MAX: u16 = 500;

/// AQI points per tier.
const AQI_TIER_WIDTH: f64 = 50.0;

/// AQI category with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AqiCategory {
    /// Category label (e.g. "Good", "Moderate")
    pub category: String,
    /// Display color as a hex string (e.g. "#4ade80")
    pub color: String,
}

/// Calculate the AQI for a PM2.5 concentration.
///
/// Negative or non-finite input clamps to 0; concentrations above the last
/// tier's maximum clamp to 500. Within a tier the value is linearly
/// interpolated over that tier's 50-point AQI sub-range and rounded to the
/// nearest integer.
pub fn calculate_aqi(pm25: f64) -> u16 {
    if !(pm25 >= 0.0) {
        return 0;
    }

    for (tier, bp) in AQI_BREAKPOINTS.iter().enumerate() {
        if pm25 <= bp.max {
            let lower_aqi = tier as f64 * AQI_TIER_WIDTH;
            let upper_aqi = lower_aqi + AQI_TIER_WIDTH;

            let aqi = (upper_aqi - lower_aqi) / (bp.max - bp.min) * (pm25 - bp.min) + lower_aqi;
            return aqi.round() as u16;
        }
    }

    AQI_MAX
}

/// Look up the AQI category for a PM2.5 concentration.
///
/// Falls back to the most severe tier if no tier matches — unreachable with
/// the current table (the last tier is checked with an unbounded clamp),
/// but kept so a table edit cannot introduce a panic path.
pub fn aqi_category(pm25: f64) -> AqiCategory {
    for bp in &AQI_BREAKPOINTS {
        if pm25 <= bp.max {
            return AqiCategory {
                category: bp.category.to_string(),
                color: bp.color.to_string(),
            };
        }
    }

    let worst = &AQI_BREAKPOINTS[AQI_BREAKPOINTS.len() - 1];
    AqiCategory {
        category: worst.category.to_string(),
        color: worst.color.to_string(),
    }
}

/// Health recommendation text for an AQI category label.
///
/// Unrecognized labels get a generic "unavailable" message — never panics.
pub fn health_recommendation(category: &str) -> &'static str {
    match category {
        "Good" => "Air quality is satisfactory, and air pollution poses little or no risk.",
        "Moderate" => {
            "Air quality is acceptable. However, some pollutants may be a concern for a \
             small number of people who are unusually sensitive to air pollution."
        }
        "Unhealthy for Sensitive Groups" => {
            "Members of sensitive groups may experience health effects. The general \
             public is less likely to be affected."
        }
        "Unhealthy" => {
            "Some members of the general public may experience health effects; members \
             of sensitive groups may experience more serious health effects."
        }
        "Very Unhealthy" => "Health alert: The risk of health effects is increased for everyone.",
        "Hazardous" => {
            "Health warning of emergency conditions: everyone is more likely to be affected."
        }
        _ => "Air quality information is currently unavailable.",
    }
}

/// Format a PM2.5 value for display (one decimal place).
pub fn format_pm25(pm25: f64) -> String {
    format!("{:.1}", pm25)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_clamps_negative_to_zero() {
        assert_eq!(calculate_aqi(-5.0), 0);
    }

    #[test]
    fn test_aqi_zero() {
        assert_eq!(calculate_aqi(0.0), 0);
    }

    #[test]
    fn test_aqi_non_finite() {
        assert_eq!(calculate_aqi(f64::NAN), 0);
        assert_eq!(calculate_aqi(f64::INFINITY), AQI_MAX);
    }

    #[test]
    fn test_aqi_tier_ceiling() {
        // Last tier's max interpolates to its sub-range ceiling (300);
        // anything above clamps to 500.
        assert_eq!(calculate_aqi(500.0), 300);
        assert_eq!(calculate_aqi(500.1), 500);
        assert_eq!(calculate_aqi(10_000.0), 500);
    }

    #[test]
    fn test_aqi_good_tier_interpolation() {
        // Midpoint of tier 0 (0–12 µg/m³ → AQI 0–50)
        assert_eq!(calculate_aqi(6.0), 25);
        assert_eq!(calculate_aqi(12.0), 50);
    }

    #[test]
    fn test_aqi_monotone_non_decreasing() {
        let mut prev = 0;
        let mut pm25 = 0.0;
        while pm25 <= 600.0 {
            let aqi = calculate_aqi(pm25);
            assert!(
                aqi >= prev,
                "AQI decreased at pm25={}: {} < {}",
                pm25,
                aqi,
                prev
            );
            prev = aqi;
            pm25 += 0.1;
        }
    }

    #[test]
    fn test_category_boundary_good() {
        let cat = aqi_category(12.0);
        assert_eq!(cat.category, "Good");
        assert_eq!(cat.color, "#4ade80");
    }

    #[test]
    fn test_category_boundary_moderate() {
        let cat = aqi_category(12.1);
        assert_eq!(cat.category, "Moderate");
        assert_eq!(cat.color, "#facc15");
    }

    #[test]
    fn test_category_above_table_is_hazardous() {
        let cat = aqi_category(1200.0);
        assert_eq!(cat.category, "Hazardous");
        assert_eq!(cat.color, "#ef4444");
    }

    #[test]
    fn test_health_recommendation_distinct() {
        let hazardous = health_recommendation("Hazardous");
        let good = health_recommendation("Good");
        assert!(!hazardous.is_empty());
        assert!(!good.is_empty());
        assert_ne!(hazardous, good);
    }

    #[test]
    fn test_health_recommendation_unknown() {
        assert_eq!(
            health_recommendation("Sparkling"),
            "Air quality information is currently unavailable."
        );
    }

    #[test]
    fn test_format_pm25() {
        assert_eq!(format_pm25(15.26), "15.3");
        assert_eq!(format_pm25(0.0), "0.0");
    }
}
