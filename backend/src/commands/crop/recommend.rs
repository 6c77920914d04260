use super::season::Season;
use crate::db::Crop;
use crate::error::{KrishiError, KrishiResult};
use crate::middleware::auth::Claims;
use crate::ml::{CropCard, CropQuery, CropSuggestion, Milestone, RecommendationService};
use crate::state::AppState;
use crate::store::AgriStore;
use axum::extract::{Json, State as AxumState};
use axum::Extension;
use serde::{Deserialize, Serialize};

const DEFAULT_RAINFALL_MM: f64 = 800.0;
const DEFAULT_LAND_SIZE: f64 = 1.0;
const MAX_FALLBACK_CROPS: usize = 5;
const FALLBACK_CONFIDENCE: &str = "85%";
const FALLBACK_RISK: &str = "Low";
const INVESTMENT_SHARE: f64 = 0.3;
const PROFIT_SHARE: f64 = 0.7;

/// Either a registered farm or an ad-hoc soil/district description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendationRequest {
    pub farm_id: Option<i32>,
    pub soil_type: Option<String>,
    pub district: Option<String>,
    pub land_size: Option<f64>,
    pub rainfall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropSite {
    pub soil_type: String,
    pub district: Option<String>,
    pub land_size: f64,
    pub rainfall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Ml,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct CropRecommendationResponse {
    pub success: bool,
    pub season: Season,
    pub source: RecommendationSource,
    pub recommendations: Vec<CropCard>,
}

pub async fn resolve_site(
    store: &dyn AgriStore,
    farmer_id: i32,
    req: &CropRecommendationRequest,
) -> KrishiResult<CropSite> {
    if let Some(farm_id) = req.farm_id {
        let farm = store
            .find_farm(farm_id, farmer_id)
            .await?
            .ok_or_else(|| KrishiError::NotFound("Farm not found".to_string()))?;
        return Ok(CropSite {
            soil_type: farm.soil_type,
            district: Some(farm.district),
            land_size: farm.land_size,
            rainfall: req.rainfall.unwrap_or(DEFAULT_RAINFALL_MM),
        });
    }

    let soil_type = req
        .soil_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| KrishiError::Validation("farmId or soilType is required".to_string()))?;

    Ok(CropSite {
        soil_type: soil_type.to_string(),
        district: req.district.clone(),
        land_size: req
            .land_size
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_LAND_SIZE),
        rainfall: req.rainfall.unwrap_or(DEFAULT_RAINFALL_MM),
    })
}

/// Asks the recommendation service first; any failure or an empty answer
/// falls back to filtering the local crop catalog. The caller never sees
/// the upstream error.
pub async fn recommend_crops(
    store: &dyn AgriStore,
    ml: &dyn RecommendationService,
    site: &CropSite,
    season: Season,
) -> KrishiResult<CropRecommendationResponse> {
    let query = CropQuery {
        soil_type: site.soil_type.clone(),
        season: season.as_str().to_string(),
        rainfall: site.rainfall,
        land_size: site.land_size,
        district: site.district.clone(),
    };

    match ml.recommend_crops(&query).await {
        Ok(advice) if advice.success && !advice.recommendations.is_empty() => {
            let catalog = if advice
                .recommendations
                .iter()
                .any(|s| matches!(s, CropSuggestion::Name(_)))
            {
                store.list_crops().await?
            } else {
                Vec::new()
            };

            let recommendations = advice
                .recommendations
                .into_iter()
                .map(|s| match s {
                    CropSuggestion::Card(card) => card,
                    CropSuggestion::Name(name) => named_crop_card(&name, &catalog, site, season),
                })
                .collect();

            return Ok(CropRecommendationResponse {
                success: true,
                season,
                source: RecommendationSource::Ml,
                recommendations,
            });
        }
        Ok(_) => tracing::warn!("ML service returned no crops, using fallback logic"),
        Err(e) => tracing::warn!("ML service unavailable, using fallback logic: {}", e),
    }

    let crops = store.list_crops().await?;
    Ok(CropRecommendationResponse {
        success: true,
        season,
        source: RecommendationSource::Fallback,
        recommendations: fallback_cards(&crops, site, season),
    })
}

/// Catalog crops suited to the soil and sowable this season, in catalog
/// order, capped at five.
pub fn fallback_cards(crops: &[Crop], site: &CropSite, season: Season) -> Vec<CropCard> {
    crops
        .iter()
        .filter(|c| c.soil_suitability.iter().any(|s| *s == site.soil_type))
        .filter(|c| season.admits(&c.season))
        .take(MAX_FALLBACK_CROPS)
        .map(|c| synthesized_card(c, site, season))
        .collect()
}

fn synthesized_card(crop: &Crop, site: &CropSite, season: Season) -> CropCard {
    let income = crop.avg_profit_per_acre * site.land_size;
    CropCard {
        name: crop.name.clone(),
        confidence: FALLBACK_CONFIDENCE.to_string(),
        income: rupees_k(income),
        investment: rupees_k(income * INVESTMENT_SHARE),
        profit: rupees_k(income * PROFIT_SHARE),
        risk: FALLBACK_RISK.to_string(),
        explanation: explanation(site, season),
        timeline: vec![
            Milestone { week: 1, task: "Soil Preparation".to_string() },
            Milestone { week: 4, task: "Fertilization".to_string() },
            Milestone { week: harvest_week(crop.duration_days), task: "Harvesting".to_string() },
        ],
    }
}

fn named_crop_card(name: &str, catalog: &[Crop], site: &CropSite, season: Season) -> CropCard {
    match catalog.iter().find(|c| c.name == name) {
        Some(crop) => synthesized_card(crop, site, season),
        None => CropCard {
            name: name.to_string(),
            confidence: String::new(),
            income: rupees_k(0.0),
            investment: rupees_k(0.0),
            profit: rupees_k(0.0),
            risk: String::new(),
            explanation: explanation(site, season),
            timeline: Vec::new(),
        },
    }
}

fn explanation(site: &CropSite, season: Season) -> String {
    format!("Suitable for {} soil in {}.", site.soil_type, season)
}

pub fn harvest_week(duration_days: i32) -> i32 {
    (duration_days as f64 / 14.0).round() as i32
}

/// Whole thousands of rupees, truncated: 17500.0 renders as "₹17K".
fn rupees_k(amount: f64) -> String {
    format!("₹{}K", amount.round() as i64 / 1000)
}

pub async fn recommend_crops_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CropRecommendationRequest>,
) -> KrishiResult<Json<CropRecommendationResponse>> {
    let site = resolve_site(state.store.as_ref(), claims.farmer_id, &payload).await?;
    let response =
        recommend_crops(state.store.as_ref(), state.ml.as_ref(), &site, Season::current()).await?;
    Ok(Json(response))
}
