//! Persistence seam for the advisory workflows.
//!
//! Handlers and orchestrators only talk to [`AgriStore`]; the Postgres
//! implementation lives in [`postgres`].

use crate::db::{
    Crop, Farm, Fertilizer, FertilizerApplicationLog, FertilizerRecommendation, NewFarm, SoilTest,
};
use crate::error::KrishiResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Clone)]
pub struct NewSoilTest {
    pub farm_id: i32,
    pub test_date: NaiveDate,
    pub nitrogen_level: Option<f64>,
    pub phosphorus_level: Option<f64>,
    pub potassium_level: Option<f64>,
    pub organic_carbon: Option<f64>,
    pub ph_level: Option<f64>,
    pub ec_level: Option<f64>,
    pub soil_health_score: i32,
}

#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub farmer_id: i32,
    pub farm_id: i32,
    pub crop_id: i32,
    pub growth_stage: String,
    pub soil_test_id: Option<Uuid>,
    pub recommendation_date: NaiveDate,
    pub fertilizer_plan: serde_json::Value,
    pub total_cost: Option<Decimal>,
    pub expected_yield_increase: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewApplicationLog {
    pub farmer_id: i32,
    pub farm_id: i32,
    pub fertilizer_id: Uuid,
    pub application_date: NaiveDate,
    pub quantity_applied: f64,
    pub application_method: Option<String>,
    pub growth_stage: Option<String>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Catalog search criteria. Every field narrows the result when present;
/// `organic_only` matches the organic type in any case.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FertilizerFilter {
    #[serde(rename = "type")]
    pub fertilizer_type: Option<String>,
    pub crop: Option<String>,
    pub npk_ratio: Option<String>,
    pub max_price: Option<Decimal>,
    pub organic_only: Option<bool>,
}

impl FertilizerFilter {
    pub fn organic_only(&self) -> bool {
        self.organic_only.unwrap_or(false)
    }

    /// Exact type to match. `organic_only` overrides it.
    pub fn exact_type(&self) -> Option<&str> {
        if self.organic_only() {
            None
        } else {
            self.fertilizer_type.as_deref()
        }
    }

    pub fn matches_type(&self, fertilizer: &Fertilizer) -> bool {
        if self.organic_only() {
            return fertilizer.fertilizer_type.eq_ignore_ascii_case("organic");
        }
        self.exact_type()
            .map_or(true, |t| fertilizer.fertilizer_type == t)
    }

    pub fn suits_crop(&self, fertilizer: &Fertilizer) -> bool {
        match &self.crop {
            Some(crop) => fertilizer
                .suitable_crops
                .iter()
                .any(|c| c == crop || c == "All crops"),
            None => true,
        }
    }
}

pub const HISTORY_LIMIT: i64 = 20;

#[async_trait]
pub trait AgriStore: Send + Sync {
    /// A farm is only visible to its owner.
    async fn find_farm(&self, farm_id: i32, farmer_id: i32) -> KrishiResult<Option<Farm>>;
    async fn list_farms(&self, farmer_id: i32) -> KrishiResult<Vec<Farm>>;
    async fn insert_farm(&self, farm: NewFarm) -> KrishiResult<Farm>;

    async fn find_crop(&self, crop_id: i32) -> KrishiResult<Option<Crop>>;
    /// Whole crop catalog in id order.
    async fn list_crops(&self) -> KrishiResult<Vec<Crop>>;

    /// Most recent test by date for the farm.
    async fn latest_soil_test(&self, farm_id: i32) -> KrishiResult<Option<SoilTest>>;
    async fn list_soil_tests(&self, farm_id: i32) -> KrishiResult<Vec<SoilTest>>;
    async fn insert_soil_test(&self, test: NewSoilTest) -> KrishiResult<SoilTest>;

    /// Exact, case-sensitive name match.
    async fn fertilizers_by_names(&self, names: &[String]) -> KrishiResult<Vec<Fertilizer>>;
    async fn search_fertilizers(&self, filter: &FertilizerFilter) -> KrishiResult<Vec<Fertilizer>>;

    async fn insert_recommendation(&self, rec: NewRecommendation) -> KrishiResult<Uuid>;
    async fn recommendation_history(
        &self,
        farmer_id: i32,
        farm_id: Option<i32>,
    ) -> KrishiResult<Vec<FertilizerRecommendation>>;

    async fn insert_application_log(
        &self,
        log: NewApplicationLog,
    ) -> KrishiResult<FertilizerApplicationLog>;
}
