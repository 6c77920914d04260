use crate::db::{Fertilizer, SoilTest};
use crate::error::{KrishiError, KrishiResult};
use crate::middleware::auth::Claims;
use crate::ml::{FertilizerQuery, PlanLine, RecommendationService, SoilSnapshot};
use crate::state::AppState;
use crate::store::{AgriStore, NewRecommendation};
use axum::extract::{Json, State as AxumState};
use axum::Extension;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerRecommendationRequest {
    pub farm_id: i32,
    pub crop_id: i32,
    pub growth_stage: String,
    pub budget: Option<f64>,
    pub prefer_organic: Option<bool>,
}

/// A plan line from the recommendation service joined with its catalog
/// entry, if the catalog has one.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPlanLine {
    pub line: PlanLine,
    pub catalog: Option<Fertilizer>,
}

impl Serialize for EnrichedPlanLine {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("fertilizer", &self.line.fertilizer)?;
        for (key, value) in &self.line.fields {
            if key != "fertilizer_id" && key != "fertilizer_details" {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry(
            "fertilizer_id",
            &self.catalog.as_ref().map(|f| f.fertilizer_id),
        )?;
        match &self.catalog {
            Some(fertilizer) => map.serialize_entry("fertilizer_details", fertilizer)?,
            None => map.serialize_entry("fertilizer_details", &Map::new())?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationBody {
    pub id: Uuid,
    pub fertilizer_plan: Vec<EnrichedPlanLine>,
    pub total_cost: f64,
    pub expected_yield_increase: f64,
    pub application_schedule: Value,
    pub tips: Value,
    pub nutrient_summary: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FertilizerRecommendationResponse {
    pub success: bool,
    pub recommendation: RecommendationBody,
}

/// Fertilizer names referenced by the plan, without repeats or blanks, in
/// the order they first appear.
pub fn distinct_names(plan: &[PlanLine]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in plan {
        if !line.fertilizer.is_empty() && !names.contains(&line.fertilizer) {
            names.push(line.fertilizer.clone());
        }
    }
    names
}

/// Left outer join of the plan against the catalog by exact name. Every
/// line survives, in order, whether or not the catalog knows it.
pub fn enrich_plan(plan: Vec<PlanLine>, catalog: &[Fertilizer]) -> Vec<EnrichedPlanLine> {
    let by_name: HashMap<&str, &Fertilizer> = catalog
        .iter()
        .map(|f| (f.fertilizer_name.as_str(), f))
        .collect();

    plan.into_iter()
        .map(|line| {
            let catalog = by_name.get(line.fertilizer.as_str()).map(|f| (*f).clone());
            EnrichedPlanLine { line, catalog }
        })
        .collect()
}

fn snapshot(test: &SoilTest) -> SoilSnapshot {
    SoilSnapshot {
        nitrogen: test.nitrogen_level,
        phosphorus: test.phosphorus_level,
        potassium: test.potassium_level,
        ph: test.ph_level,
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(2))
}

/// Builds, stores and returns a catalog-enriched fertilizer plan.
///
/// The farm must belong to the caller and the crop must exist; the latest
/// soil test is optional. The recommendation service and the store are not
/// retried and have no fallback: either failure aborts the request.
pub async fn recommend_fertilizer(
    store: &dyn AgriStore,
    ml: &dyn RecommendationService,
    farmer_id: i32,
    req: &FertilizerRecommendationRequest,
    today: NaiveDate,
) -> KrishiResult<RecommendationBody> {
    let farm = store
        .find_farm(req.farm_id, farmer_id)
        .await?
        .ok_or_else(|| KrishiError::NotFound("Farm not found".to_string()))?;

    let crop = store
        .find_crop(req.crop_id)
        .await?
        .ok_or_else(|| KrishiError::NotFound("Crop not found".to_string()))?;

    let soil_test = store.latest_soil_test(farm.id).await?;

    let query = FertilizerQuery {
        crop_name: crop.name.clone(),
        soil_type: farm.soil_type.clone(),
        land_size: farm.land_size,
        growth_stage: req.growth_stage.clone(),
        soil_test: soil_test.as_ref().map(snapshot),
        prefer_organic: req.prefer_organic.unwrap_or(false),
        budget: req.budget,
        season: crop.season.clone(),
    };
    let advice = ml.recommend_fertilizer(&query).await?;

    let names = distinct_names(&advice.fertilizer_plan);
    let catalog = store.fertilizers_by_names(&names).await?;
    let enriched = enrich_plan(advice.fertilizer_plan, &catalog);

    let id = store
        .insert_recommendation(NewRecommendation {
            farmer_id,
            farm_id: farm.id,
            crop_id: crop.id,
            growth_stage: req.growth_stage.clone(),
            soil_test_id: soil_test.as_ref().map(|t| t.soil_test_id),
            recommendation_date: today,
            fertilizer_plan: serde_json::to_value(&enriched)?,
            total_cost: to_decimal(advice.total_cost),
            expected_yield_increase: to_decimal(advice.expected_yield_increase),
        })
        .await?;

    tracing::info!(
        "Stored fertilizer recommendation {} for farm {} ({} lines, {} matched in catalog)",
        id,
        farm.id,
        enriched.len(),
        enriched.iter().filter(|l| l.catalog.is_some()).count()
    );

    Ok(RecommendationBody {
        id,
        fertilizer_plan: enriched,
        total_cost: advice.total_cost,
        expected_yield_increase: advice.expected_yield_increase,
        application_schedule: advice.schedule,
        tips: advice.tips,
        nutrient_summary: advice.nutrient_summary,
    })
}

pub async fn recommend_fertilizer_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FertilizerRecommendationRequest>,
) -> KrishiResult<Json<FertilizerRecommendationResponse>> {
    let recommendation = recommend_fertilizer(
        state.store.as_ref(),
        state.ml.as_ref(),
        claims.farmer_id,
        &payload,
        Local::now().date_naive(),
    )
    .await?;

    Ok(Json(FertilizerRecommendationResponse {
        success: true,
        recommendation,
    }))
}
