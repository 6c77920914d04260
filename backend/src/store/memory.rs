//! In-process [`AgriStore`] used by the workflow and HTTP tests.

use super::{AgriStore, FertilizerFilter, NewApplicationLog, NewRecommendation, NewSoilTest, HISTORY_LIMIT};
use crate::db::{
    Crop, Farm, Fertilizer, FertilizerApplicationLog, FertilizerRecommendation, NewFarm, SoilTest,
};
use crate::error::{KrishiError, KrishiResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    farms: Vec<Farm>,
    crops: Vec<Crop>,
    soil_tests: Vec<SoilTest>,
    fertilizers: Vec<Fertilizer>,
    recommendations: Vec<FertilizerRecommendation>,
    logs: Vec<FertilizerApplicationLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every insert fails with a database error.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_crops(self, crops: Vec<Crop>) -> Self {
        self.tables.lock().unwrap().crops = crops;
        self
    }

    pub fn with_fertilizers(self, fertilizers: Vec<Fertilizer>) -> Self {
        self.tables.lock().unwrap().fertilizers = fertilizers;
        self
    }

    pub fn add_farm(&self, farm: Farm) {
        self.tables.lock().unwrap().farms.push(farm);
    }

    pub fn add_soil_test(&self, test: SoilTest) {
        self.tables.lock().unwrap().soil_tests.push(test);
    }

    pub fn recommendations(&self) -> Vec<FertilizerRecommendation> {
        self.tables.lock().unwrap().recommendations.clone()
    }

    pub fn soil_tests(&self) -> Vec<SoilTest> {
        self.tables.lock().unwrap().soil_tests.clone()
    }

    fn check_write(&self) -> KrishiResult<()> {
        if self.fail_writes {
            return Err(KrishiError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

fn newest_first(tests: &mut [SoilTest]) {
    tests.sort_by(|a, b| {
        b.test_date
            .cmp(&a.test_date)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl AgriStore for MemoryStore {
    async fn find_farm(&self, farm_id: i32, farmer_id: i32) -> KrishiResult<Option<Farm>> {
        let t = self.tables.lock().unwrap();
        Ok(t.farms
            .iter()
            .find(|f| f.id == farm_id && f.farmer_id == farmer_id)
            .cloned())
    }

    async fn list_farms(&self, farmer_id: i32) -> KrishiResult<Vec<Farm>> {
        let t = self.tables.lock().unwrap();
        Ok(t.farms.iter().filter(|f| f.farmer_id == farmer_id).cloned().collect())
    }

    async fn insert_farm(&self, farm: NewFarm) -> KrishiResult<Farm> {
        self.check_write()?;
        let mut t = self.tables.lock().unwrap();
        let id = t.farms.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let created = Farm {
            id,
            farmer_id: farm.farmer_id,
            land_size: farm.land_size,
            soil_type: farm.soil_type,
            irrigation_source: farm.irrigation_source,
            district: farm.district,
            created_at: Utc::now(),
        };
        t.farms.push(created.clone());
        Ok(created)
    }

    async fn find_crop(&self, crop_id: i32) -> KrishiResult<Option<Crop>> {
        let t = self.tables.lock().unwrap();
        Ok(t.crops.iter().find(|c| c.id == crop_id).cloned())
    }

    async fn list_crops(&self) -> KrishiResult<Vec<Crop>> {
        let t = self.tables.lock().unwrap();
        let mut crops = t.crops.clone();
        crops.sort_by_key(|c| c.id);
        Ok(crops)
    }

    async fn latest_soil_test(&self, farm_id: i32) -> KrishiResult<Option<SoilTest>> {
        Ok(self.list_soil_tests(farm_id).await?.into_iter().next())
    }

    async fn list_soil_tests(&self, farm_id: i32) -> KrishiResult<Vec<SoilTest>> {
        let t = self.tables.lock().unwrap();
        let mut tests: Vec<SoilTest> = t
            .soil_tests
            .iter()
            .filter(|s| s.farm_id == farm_id)
            .cloned()
            .collect();
        newest_first(&mut tests);
        Ok(tests)
    }

    async fn insert_soil_test(&self, test: NewSoilTest) -> KrishiResult<SoilTest> {
        self.check_write()?;
        let created = SoilTest {
            soil_test_id: Uuid::new_v4(),
            farm_id: test.farm_id,
            test_date: test.test_date,
            nitrogen_level: test.nitrogen_level,
            phosphorus_level: test.phosphorus_level,
            potassium_level: test.potassium_level,
            organic_carbon: test.organic_carbon,
            ph_level: test.ph_level,
            ec_level: test.ec_level,
            soil_health_score: test.soil_health_score,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().soil_tests.push(created.clone());
        Ok(created)
    }

    async fn fertilizers_by_names(&self, names: &[String]) -> KrishiResult<Vec<Fertilizer>> {
        let t = self.tables.lock().unwrap();
        Ok(t.fertilizers
            .iter()
            .filter(|f| names.contains(&f.fertilizer_name))
            .cloned()
            .collect())
    }

    async fn search_fertilizers(&self, filter: &FertilizerFilter) -> KrishiResult<Vec<Fertilizer>> {
        let t = self.tables.lock().unwrap();
        let mut found: Vec<Fertilizer> = t
            .fertilizers
            .iter()
            .filter(|f| filter.matches_type(f))
            .filter(|f| {
                filter
                    .npk_ratio
                    .as_ref()
                    .map_or(true, |r| f.npk_ratio.as_ref() == Some(r))
            })
            .filter(|f| {
                filter
                    .max_price
                    .map_or(true, |max| f.price_per_kg.map_or(false, |p| p <= max))
            })
            .filter(|f| filter.suits_crop(f))
            .cloned()
            .collect();
        found.sort_by_key(|f| (f.price_per_kg.is_none(), f.price_per_kg, f.fertilizer_name.clone()));
        Ok(found)
    }

    async fn insert_recommendation(&self, rec: NewRecommendation) -> KrishiResult<Uuid> {
        self.check_write()?;
        let id = Uuid::new_v4();
        self.tables
            .lock()
            .unwrap()
            .recommendations
            .push(FertilizerRecommendation {
                recommendation_id: id,
                farmer_id: rec.farmer_id,
                farm_id: rec.farm_id,
                crop_id: rec.crop_id,
                growth_stage: rec.growth_stage,
                soil_test_id: rec.soil_test_id,
                recommendation_date: rec.recommendation_date,
                fertilizer_plan: Json(rec.fertilizer_plan),
                total_cost: rec.total_cost,
                expected_yield_increase: rec.expected_yield_increase,
                status: "suggested".to_string(),
                farmer_feedback: None,
                created_at: Utc::now(),
            });
        Ok(id)
    }

    async fn recommendation_history(
        &self,
        farmer_id: i32,
        farm_id: Option<i32>,
    ) -> KrishiResult<Vec<FertilizerRecommendation>> {
        let t = self.tables.lock().unwrap();
        let mut found: Vec<FertilizerRecommendation> = t
            .recommendations
            .iter()
            .filter(|r| r.farmer_id == farmer_id && farm_id.map_or(true, |f| r.farm_id == f))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.recommendation_date
                .cmp(&a.recommendation_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        found.truncate(HISTORY_LIMIT as usize);
        Ok(found)
    }

    async fn insert_application_log(
        &self,
        log: NewApplicationLog,
    ) -> KrishiResult<FertilizerApplicationLog> {
        self.check_write()?;
        let created = FertilizerApplicationLog {
            log_id: Uuid::new_v4(),
            farmer_id: log.farmer_id,
            farm_id: log.farm_id,
            fertilizer_id: log.fertilizer_id,
            application_date: log.application_date,
            quantity_applied: log.quantity_applied,
            application_method: log.application_method,
            growth_stage: log.growth_stage,
            cost: log.cost,
            notes: log.notes,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().logs.push(created.clone());
        Ok(created)
    }
}
