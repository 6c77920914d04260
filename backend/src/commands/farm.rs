use crate::db::{Farm, NewFarm};
use crate::error::{KrishiError, KrishiResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::store::AgriStore;
use axum::extract::{Json, State as AxumState};
use axum::http::StatusCode;
use axum::Extension;
use serde::{Deserialize, Serialize};

const DEFAULT_IRRIGATION: &str = "Rainfed";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmRequest {
    pub land_size: f64,
    pub soil_type: String,
    pub irrigation_source: Option<String>,
    pub district: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmResponse {
    pub success: bool,
    pub farm: Farm,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmList {
    pub success: bool,
    pub farms: Vec<Farm>,
}

fn required(value: &str, field: &str) -> KrishiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(KrishiError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

pub async fn add_farm(
    store: &dyn AgriStore,
    farmer_id: i32,
    req: FarmRequest,
) -> KrishiResult<Farm> {
    if req.land_size <= 0.0 {
        return Err(KrishiError::Validation(
            "Land size must be greater than zero".to_string(),
        ));
    }
    let soil_type = required(&req.soil_type, "Soil type")?;
    let district = required(&req.district, "District")?;
    let irrigation_source = req
        .irrigation_source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_IRRIGATION.to_string());

    let farm = store
        .insert_farm(NewFarm {
            farmer_id,
            land_size: req.land_size,
            soil_type,
            irrigation_source,
            district,
        })
        .await?;
    tracing::info!("Farm {} registered for farmer {}", farm.id, farmer_id);
    Ok(farm)
}

pub async fn add_farm_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FarmRequest>,
) -> KrishiResult<(StatusCode, Json<FarmResponse>)> {
    let farm = add_farm(state.store.as_ref(), claims.farmer_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(FarmResponse {
            success: true,
            farm,
        }),
    ))
}

pub async fn get_my_farms_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
) -> KrishiResult<Json<FarmList>> {
    let farms = state.store.list_farms(claims.farmer_id).await?;
    Ok(Json(FarmList {
        success: true,
        farms,
    }))
}
