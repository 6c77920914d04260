use crate::commands::crop;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/recommend", post(crop::recommend_crops_axum))
}
