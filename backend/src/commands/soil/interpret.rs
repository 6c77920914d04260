use crate::db::SoilTest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallHealth {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl OverallHealth {
    pub fn from_score(score: i32) -> Self {
        if score >= 80 {
            OverallHealth::Excellent
        } else if score >= 60 {
            OverallHealth::Good
        } else if score >= 40 {
            OverallHealth::Fair
        } else {
            OverallHealth::Poor
        }
    }
}

pub const OPTIMAL: &str = "Optimal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilInterpretation {
    pub overall_health: OverallHealth,
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
    pub ph: String,
    pub recommendations: Vec<String>,
}

/// How a single reading is judged against its range.
struct Verdict {
    label: &'static str,
    action: Option<&'static str>,
}

impl Verdict {
    const fn optimal() -> Self {
        Verdict { label: OPTIMAL, action: None }
    }
}

fn judge(value: Option<f64>, low: f64, high: f64, below: Verdict, above: Verdict) -> Verdict {
    match value {
        Some(v) if v < low => below,
        Some(v) if v > high => above,
        _ => Verdict::optimal(),
    }
}

/// Narrative reading of a stored soil test. Readings are judged
/// independently and remediation actions are collected in N, P, K, pH order.
/// Only deficiencies (low nutrients, acidic or alkaline soil) add an action.
pub fn interpret_soil_test(test: &SoilTest) -> SoilInterpretation {
    let verdicts = [
        judge(
            test.nitrogen_level,
            280.0,
            560.0,
            Verdict {
                label: "Low - Apply Urea or DAP",
                action: Some("Apply 50 kg/acre Urea during vegetative stage"),
            },
            Verdict { label: "High - Reduce nitrogen fertilizers", action: None },
        ),
        judge(
            test.phosphorus_level,
            11.0,
            25.0,
            Verdict {
                label: "Low - Apply DAP or SSP",
                action: Some("Apply 25 kg/acre DAP as basal dose"),
            },
            Verdict { label: "High - Skip phosphatic fertilizers", action: None },
        ),
        judge(
            test.potassium_level,
            110.0,
            280.0,
            Verdict {
                label: "Low - Apply MOP",
                action: Some("Apply 15 kg/acre MOP"),
            },
            Verdict { label: "High - Maintain current levels", action: None },
        ),
        judge(
            test.ph_level,
            6.0,
            8.0,
            Verdict {
                label: "Acidic - Apply lime",
                action: Some("Apply agricultural lime 200 kg/acre"),
            },
            Verdict {
                label: "Alkaline - Apply gypsum",
                action: Some("Apply gypsum 250 kg/acre"),
            },
        ),
    ];

    let recommendations = verdicts
        .iter()
        .filter_map(|v| v.action.map(str::to_string))
        .collect();
    let [n, p, k, ph] = verdicts;

    SoilInterpretation {
        overall_health: OverallHealth::from_score(test.soil_health_score),
        nitrogen: n.label.to_string(),
        phosphorus: p.label.to_string(),
        potassium: k.label.to_string(),
        ph: ph.label.to_string(),
        recommendations,
    }
}
