use crate::db::FertilizerApplicationLog;
use crate::error::{KrishiError, KrishiResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::store::{AgriStore, NewApplicationLog};
use axum::extract::{Json, State as AxumState};
use axum::Extension;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationLogRequest {
    pub farm_id: i32,
    pub fertilizer_id: Uuid,
    pub quantity: f64,
    pub application_method: Option<String>,
    pub growth_stage: Option<String>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationLogResponse {
    pub success: bool,
    pub log: FertilizerApplicationLog,
    pub message: String,
}

pub async fn log_application(
    store: &dyn AgriStore,
    farmer_id: i32,
    req: ApplicationLogRequest,
    today: NaiveDate,
) -> KrishiResult<FertilizerApplicationLog> {
    if req.quantity <= 0.0 {
        return Err(KrishiError::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }

    let farm = store
        .find_farm(req.farm_id, farmer_id)
        .await?
        .ok_or_else(|| KrishiError::NotFound("Farm not found".to_string()))?;

    store
        .insert_application_log(NewApplicationLog {
            farmer_id,
            farm_id: farm.id,
            fertilizer_id: req.fertilizer_id,
            application_date: today,
            quantity_applied: req.quantity,
            application_method: req.application_method,
            growth_stage: req.growth_stage,
            cost: req.cost,
            notes: req.notes,
        })
        .await
}

pub async fn log_application_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplicationLogRequest>,
) -> KrishiResult<Json<ApplicationLogResponse>> {
    let log = log_application(
        state.store.as_ref(),
        claims.farmer_id,
        payload,
        Local::now().date_naive(),
    )
    .await?;
    Ok(Json(ApplicationLogResponse {
        success: true,
        log,
        message: "Application logged successfully".to_string(),
    }))
}
