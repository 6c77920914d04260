use crate::config::AppConfig;
use crate::ml::RecommendationService;
use crate::store::AgriStore;
use std::sync::Arc;

/// Shared, read-only handles given to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AgriStore>,
    pub ml: Arc<dyn RecommendationService>,
    /// Client for the weather and news feeds, bounded by the ML timeout.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn AgriStore>,
        ml: Arc<dyn RecommendationService>,
    ) -> crate::error::KrishiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.ml_timeout)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            store,
            ml,
            http,
        })
    }
}
