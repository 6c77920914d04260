use super::interpret::{interpret_soil_test, SoilInterpretation};
use super::score::{soil_health_score, SoilReadings};
use crate::db::SoilTest;
use crate::error::{KrishiError, KrishiResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::store::{AgriStore, NewSoilTest};
use axum::extract::{Json, Path, State as AxumState};
use axum::Extension;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lab readings as entered by the farmer. Every field may be left out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilTestInput {
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub ph: Option<f64>,
    pub organic_carbon: Option<f64>,
    pub ec: Option<f64>,
}

impl SoilTestInput {
    fn readings(&self) -> SoilReadings {
        SoilReadings {
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            ph: self.ph,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SoilTestResponse {
    pub success: bool,
    pub soil_test: SoilTest,
    pub interpretation: SoilInterpretation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoilTestList {
    pub success: bool,
    pub soil_tests: Vec<SoilTest>,
}

pub async fn upload_soil_test(
    store: &dyn AgriStore,
    farmer_id: i32,
    farm_id: i32,
    input: &SoilTestInput,
    today: NaiveDate,
) -> KrishiResult<SoilTestResponse> {
    let farm = store
        .find_farm(farm_id, farmer_id)
        .await?
        .ok_or_else(|| KrishiError::NotFound("Farm not found".to_string()))?;

    let score = soil_health_score(&input.readings());
    let soil_test = store
        .insert_soil_test(NewSoilTest {
            farm_id: farm.id,
            test_date: today,
            nitrogen_level: input.nitrogen,
            phosphorus_level: input.phosphorus,
            potassium_level: input.potassium,
            organic_carbon: input.organic_carbon,
            ph_level: input.ph,
            ec_level: input.ec,
            soil_health_score: score,
        })
        .await?;

    tracing::info!("Soil test recorded for farm {} (score {})", farm.id, score);

    let interpretation = interpret_soil_test(&soil_test);
    Ok(SoilTestResponse {
        success: true,
        soil_test,
        interpretation,
    })
}

pub async fn list_soil_tests(
    store: &dyn AgriStore,
    farmer_id: i32,
    farm_id: i32,
) -> KrishiResult<Vec<SoilTest>> {
    store
        .find_farm(farm_id, farmer_id)
        .await?
        .ok_or_else(|| KrishiError::NotFound("Farm not found".to_string()))?;
    store.list_soil_tests(farm_id).await
}

pub async fn upload_soil_test_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Path(farm_id): Path<i32>,
    Json(payload): Json<SoilTestInput>,
) -> KrishiResult<Json<SoilTestResponse>> {
    let res = upload_soil_test(
        state.store.as_ref(),
        claims.farmer_id,
        farm_id,
        &payload,
        Local::now().date_naive(),
    )
    .await?;
    Ok(Json(res))
}

pub async fn get_soil_tests_axum(
    AxumState(state): AxumState<AppState>,
    Extension(claims): Extension<Claims>,
    Path(farm_id): Path<i32>,
) -> KrishiResult<Json<SoilTestList>> {
    let soil_tests = list_soil_tests(state.store.as_ref(), claims.farmer_id, farm_id).await?;
    Ok(Json(SoilTestList {
        success: true,
        soil_tests,
    }))
}
