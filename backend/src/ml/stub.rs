//! Canned [`RecommendationService`] for workflow and HTTP tests.

use super::{CropAdvice, CropQuery, FertilizerAdvice, FertilizerQuery, RecommendationService};
use crate::error::{KrishiError, KrishiResult};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct StubMl {
    fertilizer: Option<FertilizerAdvice>,
    crops: Option<CropAdvice>,
    fertilizer_queries: Mutex<Vec<FertilizerQuery>>,
    crop_queries: Mutex<Vec<CropQuery>>,
}

impl StubMl {
    /// Every call fails as if the service were down.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_fertilizer(mut self, advice: FertilizerAdvice) -> Self {
        self.fertilizer = Some(advice);
        self
    }

    pub fn with_crops(mut self, advice: CropAdvice) -> Self {
        self.crops = Some(advice);
        self
    }

    pub fn fertilizer_queries(&self) -> Vec<FertilizerQuery> {
        self.fertilizer_queries.lock().unwrap().clone()
    }

    pub fn crop_queries(&self) -> Vec<CropQuery> {
        self.crop_queries.lock().unwrap().clone()
    }
}

fn offline() -> KrishiError {
    KrishiError::Upstream("connection refused".to_string())
}

#[async_trait]
impl RecommendationService for StubMl {
    async fn recommend_fertilizer(&self, query: &FertilizerQuery) -> KrishiResult<FertilizerAdvice> {
        self.fertilizer_queries.lock().unwrap().push(query.clone());
        self.fertilizer.clone().ok_or_else(offline)
    }

    async fn recommend_crops(&self, query: &CropQuery) -> KrishiResult<CropAdvice> {
        self.crop_queries.lock().unwrap().push(query.clone());
        self.crops.clone().ok_or_else(offline)
    }
}
