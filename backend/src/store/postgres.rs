use super::{AgriStore, FertilizerFilter, NewApplicationLog, NewRecommendation, NewSoilTest, HISTORY_LIMIT};
use crate::db::{
    Crop, DbPool, Farm, Fertilizer, FertilizerApplicationLog, FertilizerRecommendation, NewFarm,
    SoilTest,
};
use crate::error::KrishiResult;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{query, query_as};
use uuid::Uuid;

const FERTILIZER_COLUMNS: &str = "fertilizer_id, fertilizer_name, fertilizer_type, npk_ratio, nitrogen_percent, phosphorus_percent, potassium_percent, application_method, suitable_crops, price_per_kg, manufacturer, image_url";

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AgriStore for PgStore {
    async fn find_farm(&self, farm_id: i32, farmer_id: i32) -> KrishiResult<Option<Farm>> {
        let farm = query_as::<_, Farm>("SELECT * FROM farms WHERE id = $1 AND farmer_id = $2")
            .bind(farm_id)
            .bind(farmer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(farm)
    }

    async fn list_farms(&self, farmer_id: i32) -> KrishiResult<Vec<Farm>> {
        let farms = query_as::<_, Farm>("SELECT * FROM farms WHERE farmer_id = $1 ORDER BY id ASC")
            .bind(farmer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(farms)
    }

    async fn insert_farm(&self, farm: NewFarm) -> KrishiResult<Farm> {
        let created = query_as::<_, Farm>(
            "INSERT INTO farms (farmer_id, land_size, soil_type, irrigation_source, district) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(farm.farmer_id)
        .bind(farm.land_size)
        .bind(&farm.soil_type)
        .bind(&farm.irrigation_source)
        .bind(&farm.district)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_crop(&self, crop_id: i32) -> KrishiResult<Option<Crop>> {
        let crop = query_as::<_, Crop>("SELECT * FROM crops WHERE id = $1")
            .bind(crop_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(crop)
    }

    async fn list_crops(&self) -> KrishiResult<Vec<Crop>> {
        let crops = query_as::<_, Crop>("SELECT * FROM crops ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(crops)
    }

    async fn latest_soil_test(&self, farm_id: i32) -> KrishiResult<Option<SoilTest>> {
        let test = query_as::<_, SoilTest>(
            "SELECT * FROM soil_nutrients WHERE farm_id = $1 ORDER BY test_date DESC, created_at DESC LIMIT 1",
        )
        .bind(farm_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(test)
    }

    async fn list_soil_tests(&self, farm_id: i32) -> KrishiResult<Vec<SoilTest>> {
        let tests = query_as::<_, SoilTest>(
            "SELECT * FROM soil_nutrients WHERE farm_id = $1 ORDER BY test_date DESC, created_at DESC",
        )
        .bind(farm_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    async fn insert_soil_test(&self, test: NewSoilTest) -> KrishiResult<SoilTest> {
        let created = query_as::<_, SoilTest>(
            "INSERT INTO soil_nutrients (
                soil_test_id, farm_id, test_date, nitrogen_level, phosphorus_level, potassium_level,
                organic_carbon, ph_level, ec_level, soil_health_score
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(test.farm_id)
        .bind(test.test_date)
        .bind(test.nitrogen_level)
        .bind(test.phosphorus_level)
        .bind(test.potassium_level)
        .bind(test.organic_carbon)
        .bind(test.ph_level)
        .bind(test.ec_level)
        .bind(test.soil_health_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn fertilizers_by_names(&self, names: &[String]) -> KrishiResult<Vec<Fertilizer>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM fertilizers WHERE fertilizer_name = ANY($1)",
            FERTILIZER_COLUMNS
        );
        let fertilizers = query_as::<_, Fertilizer>(&sql)
            .bind(names)
            .fetch_all(&self.pool)
            .await?;
        Ok(fertilizers)
    }

    async fn search_fertilizers(&self, filter: &FertilizerFilter) -> KrishiResult<Vec<Fertilizer>> {
        let sql = format!(
            "SELECT {} FROM fertilizers
             WHERE ($1::TEXT IS NULL OR fertilizer_type = $1)
               AND ($4::BOOLEAN IS NOT TRUE OR LOWER(fertilizer_type) = 'organic')
               AND ($2::TEXT IS NULL OR npk_ratio = $2)
               AND ($3::NUMERIC IS NULL OR price_per_kg <= $3)
             ORDER BY price_per_kg ASC NULLS LAST, fertilizer_name ASC",
            FERTILIZER_COLUMNS
        );
        let fertilizers = query_as::<_, Fertilizer>(&sql)
            .bind(filter.exact_type())
            .bind(&filter.npk_ratio)
            .bind(filter.max_price)
            .bind(filter.organic_only())
            .fetch_all(&self.pool)
            .await?;

        // Suitable crops are matched in Rust so "All crops" entries are kept.
        Ok(fertilizers
            .into_iter()
            .filter(|f| filter.suits_crop(f))
            .collect())
    }

    async fn insert_recommendation(&self, rec: NewRecommendation) -> KrishiResult<Uuid> {
        let id = Uuid::new_v4();
        query(
            "INSERT INTO fertilizer_recommendations (
                recommendation_id, farmer_id, farm_id, crop_id, growth_stage, soil_test_id,
                recommendation_date, fertilizer_plan, total_cost, expected_yield_increase, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'suggested')",
        )
        .bind(id)
        .bind(rec.farmer_id)
        .bind(rec.farm_id)
        .bind(rec.crop_id)
        .bind(&rec.growth_stage)
        .bind(rec.soil_test_id)
        .bind(rec.recommendation_date)
        .bind(Json(rec.fertilizer_plan))
        .bind(rec.total_cost)
        .bind(rec.expected_yield_increase)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn recommendation_history(
        &self,
        farmer_id: i32,
        farm_id: Option<i32>,
    ) -> KrishiResult<Vec<FertilizerRecommendation>> {
        let records = query_as::<_, FertilizerRecommendation>(
            "SELECT * FROM fertilizer_recommendations
             WHERE farmer_id = $1 AND ($2::INTEGER IS NULL OR farm_id = $2)
             ORDER BY recommendation_date DESC, created_at DESC
             LIMIT $3",
        )
        .bind(farmer_id)
        .bind(farm_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn insert_application_log(
        &self,
        log: NewApplicationLog,
    ) -> KrishiResult<FertilizerApplicationLog> {
        let created = query_as::<_, FertilizerApplicationLog>(
            "INSERT INTO fertilizer_application_log (
                log_id, farmer_id, farm_id, fertilizer_id, application_date, quantity_applied,
                application_method, growth_stage, cost, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(log.farmer_id)
        .bind(log.farm_id)
        .bind(log.fertilizer_id)
        .bind(log.application_date)
        .bind(log.quantity_applied)
        .bind(&log.application_method)
        .bind(&log.growth_stage)
        .bind(log.cost)
        .bind(&log.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}
