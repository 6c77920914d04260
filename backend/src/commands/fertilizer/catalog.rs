use crate::db::Fertilizer;
use crate::error::KrishiResult;
use crate::state::AppState;
use crate::store::FertilizerFilter;
use axum::extract::{Json, Query, State as AxumState};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FertilizerSearchResponse {
    pub success: bool,
    pub count: usize,
    pub fertilizers: Vec<Fertilizer>,
}

pub async fn search_fertilizers_axum(
    AxumState(state): AxumState<AppState>,
    Query(filter): Query<FertilizerFilter>,
) -> KrishiResult<Json<FertilizerSearchResponse>> {
    let fertilizers = state.store.search_fertilizers(&filter).await?;
    Ok(Json(FertilizerSearchResponse {
        success: true,
        count: fertilizers.len(),
        fertilizers,
    }))
}
