use serde::{Deserialize, Serialize};

/// Macro-nutrient and pH readings for a soil sample. Any reading may be
/// missing; the scorer substitutes lenient defaults instead of rejecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilReadings {
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub ph: Option<f64>,
}

const NEUTRAL_PH: f64 = 7.0;

/// Soil health on a 0-100 scale: four bands of up to 25 points each.
///
/// Optimal ranges (kg/ha): N 280-560, P 11-25, K 110-280, pH 6.5-7.5.
/// Missing N/P/K count as zero and a missing or non-positive pH as
/// neutral, so an empty sample still scores 55.
pub fn soil_health_score(readings: &SoilReadings) -> i32 {
    nitrogen_points(readings.nitrogen.unwrap_or(0.0))
        + phosphorus_points(readings.phosphorus.unwrap_or(0.0))
        + potassium_points(readings.potassium.unwrap_or(0.0))
        + ph_points(readings.ph.filter(|ph| *ph > 0.0).unwrap_or(NEUTRAL_PH))
}

fn band_points(value: f64, low: f64, high: f64) -> i32 {
    if value >= low && value <= high {
        25
    } else if value > high {
        15
    } else {
        10
    }
}

pub fn nitrogen_points(n: f64) -> i32 {
    band_points(n, 280.0, 560.0)
}

pub fn phosphorus_points(p: f64) -> i32 {
    band_points(p, 11.0, 25.0)
}

pub fn potassium_points(k: f64) -> i32 {
    band_points(k, 110.0, 280.0)
}

pub fn ph_points(ph: f64) -> i32 {
    if (6.5..=7.5).contains(&ph) {
        25
    } else if (6.0..8.0).contains(&ph) {
        15
    } else {
        5
    }
}
