use crate::commands::online;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/online/weather", get(online::get_weather_axum))
        .route("/api/online/news", get(online::get_news_axum))
}
