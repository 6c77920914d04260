use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{KrishiError, KrishiResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> KrishiResult<DbPool> {
    // Lazy: nothing connects until the first query.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> KrishiResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| KrishiError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Prefer);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool) -> KrishiResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    ensure_seeds(pool).await?;
    tracing::info!("Database ready");
    Ok(())
}

struct CropSeed {
    name: &'static str,
    season: &'static str,
    soils: &'static [&'static str],
    duration_days: i32,
    rainfall: (f64, f64),
    temp: (f64, f64),
    expected_yield: &'static str,
    avg_profit_per_acre: f64,
}

const CROP_SEEDS: &[CropSeed] = &[
    CropSeed { name: "Soybean", season: "Kharif", soils: &["Black", "Red"], duration_days: 90, rainfall: (600.0, 1000.0), temp: (20.0, 35.0), expected_yield: "15-20 quintals/acre", avg_profit_per_acre: 25000.0 },
    CropSeed { name: "Cotton", season: "Kharif", soils: &["Black"], duration_days: 150, rainfall: (500.0, 800.0), temp: (21.0, 35.0), expected_yield: "8-12 quintals/acre", avg_profit_per_acre: 35000.0 },
    CropSeed { name: "Wheat", season: "Rabi", soils: &["Alluvial", "Black"], duration_days: 120, rainfall: (400.0, 600.0), temp: (10.0, 25.0), expected_yield: "20-25 quintals/acre", avg_profit_per_acre: 22000.0 },
    CropSeed { name: "Rice", season: "Kharif", soils: &["Clay", "Alluvial"], duration_days: 120, rainfall: (1000.0, 2000.0), temp: (20.0, 37.0), expected_yield: "25-30 quintals/acre", avg_profit_per_acre: 28000.0 },
    CropSeed { name: "Tur Dal (Pigeon Pea)", season: "Kharif", soils: &["Red", "Black"], duration_days: 150, rainfall: (600.0, 800.0), temp: (20.0, 35.0), expected_yield: "8-10 quintals/acre", avg_profit_per_acre: 30000.0 },
    CropSeed { name: "Maize", season: "Kharif", soils: &["Alluvial", "Red"], duration_days: 90, rainfall: (500.0, 800.0), temp: (18.0, 32.0), expected_yield: "18-22 quintals/acre", avg_profit_per_acre: 20000.0 },
    CropSeed { name: "Sugarcane", season: "Year-round", soils: &["Alluvial", "Black"], duration_days: 365, rainfall: (1000.0, 1500.0), temp: (20.0, 35.0), expected_yield: "300-400 quintals/acre", avg_profit_per_acre: 60000.0 },
    CropSeed { name: "Onion", season: "Rabi", soils: &["Red", "Alluvial"], duration_days: 120, rainfall: (400.0, 600.0), temp: (15.0, 30.0), expected_yield: "100-150 quintals/acre", avg_profit_per_acre: 45000.0 },
];

struct FertilizerSeed {
    name: &'static str,
    kind: &'static str,
    npk: (f64, f64, f64),
    method: &'static str,
    crops: &'static [&'static str],
    price: &'static str,
    manufacturer: &'static str,
}

const FERTILIZER_SEEDS: &[FertilizerSeed] = &[
    FertilizerSeed { name: "Urea", kind: "chemical", npk: (46.0, 0.0, 0.0), method: "Broadcast or Top Dressing", crops: &["Rice", "Wheat", "Maize", "Cotton"], price: "5.32", manufacturer: "IFFCO" },
    FertilizerSeed { name: "DAP", kind: "chemical", npk: (18.0, 46.0, 0.0), method: "Basal Application", crops: &["Wheat", "Rice", "Soybean", "Cotton"], price: "27.00", manufacturer: "IFFCO" },
    FertilizerSeed { name: "MOP", kind: "chemical", npk: (0.0, 0.0, 60.0), method: "Soil Application", crops: &["Sugarcane", "Cotton", "Potato", "Banana"], price: "19.00", manufacturer: "IPL" },
    FertilizerSeed { name: "NPK 10:26:26", kind: "chemical", npk: (10.0, 26.0, 26.0), method: "Basal Application", crops: &["All crops"], price: "22.00", manufacturer: "IFFCO" },
    FertilizerSeed { name: "SSP", kind: "chemical", npk: (0.0, 16.0, 0.0), method: "Basal Application", crops: &["Soybean", "Groundnut", "Onion"], price: "8.50", manufacturer: "Coromandel" },
    FertilizerSeed { name: "Vermicompost", kind: "organic", npk: (1.5, 1.0, 1.0), method: "Soil Application", crops: &["All crops"], price: "6.00", manufacturer: "Local" },
    FertilizerSeed { name: "Neem Cake", kind: "organic", npk: (5.0, 1.0, 2.0), method: "Soil Application", crops: &["All crops"], price: "25.00", manufacturer: "Local" },
    FertilizerSeed { name: "Azotobacter", kind: "bio", npk: (0.0, 0.0, 0.0), method: "Seed Treatment", crops: &["Wheat", "Maize", "Cotton"], price: "120.00", manufacturer: "IFFCO" },
];

async fn ensure_seeds(pool: &DbPool) -> KrishiResult<()> {
    for seed in CROP_SEEDS {
        let soils: Vec<String> = seed.soils.iter().map(|s| s.to_string()).collect();
        sqlx::query(
            "INSERT INTO crops (name, season, soil_suitability, duration_days, min_rainfall, max_rainfall, min_temp, max_temp, expected_yield, avg_profit_per_acre)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) ON CONFLICT (name) DO NOTHING",
        )
        .bind(seed.name)
        .bind(seed.season)
        .bind(&soils)
        .bind(seed.duration_days)
        .bind(seed.rainfall.0)
        .bind(seed.rainfall.1)
        .bind(seed.temp.0)
        .bind(seed.temp.1)
        .bind(seed.expected_yield)
        .bind(seed.avg_profit_per_acre)
        .execute(pool)
        .await?;
    }

    for seed in FERTILIZER_SEEDS {
        let crops: Vec<String> = seed.crops.iter().map(|s| s.to_string()).collect();
        let price = Decimal::from_str(seed.price).unwrap_or_default();
        let npk_ratio = format!("{}-{}-{}", seed.npk.0, seed.npk.1, seed.npk.2);
        sqlx::query(
            "INSERT INTO fertilizers (fertilizer_id, fertilizer_name, fertilizer_type, npk_ratio, nitrogen_percent, phosphorus_percent, potassium_percent, application_method, suitable_crops, price_per_kg, manufacturer)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) ON CONFLICT (fertilizer_name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(seed.name)
        .bind(seed.kind)
        .bind(npk_ratio)
        .bind(seed.npk.0)
        .bind(seed.npk.1)
        .bind(seed.npk.2)
        .bind(seed.method)
        .bind(&crops)
        .bind(price)
        .bind(seed.manufacturer)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Farm {
    pub id: i32,
    pub farmer_id: i32,
    pub land_size: f64,
    pub soil_type: String,
    pub irrigation_source: String,
    pub district: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFarm {
    pub farmer_id: i32,
    pub land_size: f64,
    pub soil_type: String,
    pub irrigation_source: String,
    pub district: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Crop {
    pub id: i32,
    pub name: String,
    pub season: String,
    pub soil_suitability: Vec<String>,
    pub duration_days: i32,
    pub min_rainfall: Option<f64>,
    pub max_rainfall: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub expected_yield: Option<String>,
    pub avg_profit_per_acre: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SoilTest {
    pub soil_test_id: Uuid,
    pub farm_id: i32,
    pub test_date: NaiveDate,
    pub nitrogen_level: Option<f64>,
    pub phosphorus_level: Option<f64>,
    pub potassium_level: Option<f64>,
    pub organic_carbon: Option<f64>,
    pub ph_level: Option<f64>,
    pub ec_level: Option<f64>,
    pub soil_health_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Fertilizer {
    pub fertilizer_id: Uuid,
    pub fertilizer_name: String,
    pub fertilizer_type: String,
    pub npk_ratio: Option<String>,
    pub nitrogen_percent: Option<f64>,
    pub phosphorus_percent: Option<f64>,
    pub potassium_percent: Option<f64>,
    pub application_method: Option<String>,
    pub suitable_crops: Vec<String>,
    pub price_per_kg: Option<Decimal>,
    pub manufacturer: Option<String>,
    pub image_url: Option<String>,
}

/// Stored recommendation. The plan column holds the enriched plan exactly as
/// it was returned to the farmer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FertilizerRecommendation {
    pub recommendation_id: Uuid,
    pub farmer_id: i32,
    pub farm_id: i32,
    pub crop_id: i32,
    pub growth_stage: String,
    pub soil_test_id: Option<Uuid>,
    pub recommendation_date: NaiveDate,
    pub fertilizer_plan: Json<serde_json::Value>,
    pub total_cost: Option<Decimal>,
    pub expected_yield_increase: Option<Decimal>,
    pub status: String,
    pub farmer_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FertilizerApplicationLog {
    pub log_id: Uuid,
    pub farmer_id: i32,
    pub farm_id: i32,
    pub fertilizer_id: Uuid,
    pub application_date: NaiveDate,
    pub quantity_applied: f64,
    pub application_method: Option<String>,
    pub growth_stage: Option<String>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
