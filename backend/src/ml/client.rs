use super::{CropAdvice, CropQuery, FertilizerAdvice, FertilizerQuery, RecommendationService};
use crate::error::{KrishiError, KrishiResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the Python recommendation service.
#[derive(Clone)]
pub struct MlClient {
    client: reqwest::Client,
    base_url: String,
}

impl MlClient {
    pub fn new(base_url: &str, timeout: Duration) -> KrishiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<Q, R>(&self, path: &str, body: &Q) -> KrishiResult<R>
    where
        Q: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| upstream(path, e))?;

        let status = res.status();
        let raw: Value = res.json().await.map_err(|e| upstream(path, e))?;

        if !status.is_success() {
            return Err(KrishiError::Upstream(format!(
                "{} returned {}: {}",
                path,
                status,
                error_message(&raw).unwrap_or("no details")
            )));
        }
        // The service reports domain failures (unknown crop, ...) with a 200
        // and an `error` field.
        if let Some(msg) = error_message(&raw) {
            return Err(KrishiError::Upstream(format!("{}: {}", path, msg)));
        }

        serde_json::from_value(raw)
            .map_err(|e| KrishiError::Upstream(format!("{}: unexpected response ({})", path, e)))
    }
}

fn upstream(path: &str, e: reqwest::Error) -> KrishiError {
    if e.is_timeout() {
        KrishiError::Upstream(format!("{} timed out", path))
    } else {
        KrishiError::Upstream(format!("{}: {}", path, e))
    }
}

fn error_message(raw: &Value) -> Option<&str> {
    raw.get("error").and_then(Value::as_str)
}

#[async_trait]
impl RecommendationService for MlClient {
    async fn recommend_fertilizer(&self, query: &FertilizerQuery) -> KrishiResult<FertilizerAdvice> {
        self.post_json("/fertilizer/recommend", query).await
    }

    async fn recommend_crops(&self, query: &CropQuery) -> KrishiResult<CropAdvice> {
        self.post_json("/recommend", query).await
    }
}
