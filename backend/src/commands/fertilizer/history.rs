use crate::db::FertilizerRecommendation;
use crate::error::KrishiResult;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Json, Path, State as AxumState};
use axum::Extension;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationHistory {
    pub success: bool,
    pub recommendations: Vec<FertilizerRecommendation>,
}

pub async fn get_history_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
) -> KrishiResult<Json<RecommendationHistory>> {
    let recommendations = state
        .store
        .recommendation_history(claims.farmer_id, None)
        .await?;
    Ok(Json(RecommendationHistory {
        success: true,
        recommendations,
    }))
}

pub async fn get_farm_history_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Path(farm_id): Path<i32>,
) -> KrishiResult<Json<RecommendationHistory>> {
    let recommendations = state
        .store
        .recommendation_history(claims.farmer_id, Some(farm_id))
        .await?;
    Ok(Json(RecommendationHistory {
        success: true,
        recommendations,
    }))
}
