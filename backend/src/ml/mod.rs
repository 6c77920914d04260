//! Contract with the external recommendation (ML) service.

use crate::error::KrishiResult;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub mod client;
#[cfg(test)]
pub mod stub;

pub use client::MlClient;

/// Nutrient snapshot taken from the latest soil test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSnapshot {
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub ph: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerQuery {
    pub crop_name: String,
    pub soil_type: String,
    pub land_size: f64,
    pub growth_stage: String,
    pub soil_test: Option<SoilSnapshot>,
    pub prefer_organic: bool,
    pub budget: Option<f64>,
    pub season: String,
}

/// One application in the returned plan. Only the fertilizer name is
/// interpreted here; every other field is carried through untouched. A
/// missing or null name reads as empty so the line is still kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLine {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fertilizer: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerAdvice {
    pub fertilizer_plan: Vec<PlanLine>,
    pub total_cost: f64,
    pub expected_yield_increase: f64,
    #[serde(default)]
    pub schedule: Value,
    #[serde(default)]
    pub tips: Value,
    #[serde(default)]
    pub nutrient_summary: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropQuery {
    pub soil_type: String,
    pub season: String,
    pub rainfall: f64,
    pub land_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub week: i32,
    pub task: String,
}

/// A crop suggestion as shown to the farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropCard {
    pub name: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub income: String,
    #[serde(default)]
    pub investment: String,
    #[serde(default)]
    pub profit: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub timeline: Vec<Milestone>,
}

/// The service answers either with full cards or with bare crop names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CropSuggestion {
    Name(String),
    Card(CropCard),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropAdvice {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub recommendations: Vec<CropSuggestion>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn default_success() -> bool {
    true
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend_fertilizer(&self, query: &FertilizerQuery) -> KrishiResult<FertilizerAdvice>;
    async fn recommend_crops(&self, query: &CropQuery) -> KrishiResult<CropAdvice>;
}
