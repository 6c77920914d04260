use crate::commands::{fertilizer, soil};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/fertilizer/recommendations",
            post(fertilizer::recommend_fertilizer_axum),
        )
        .route(
            "/api/fertilizer/recommendations/history",
            get(fertilizer::get_history_axum),
        )
        .route(
            "/api/fertilizer/recommendations/history/:farm_id",
            get(fertilizer::get_farm_history_axum),
        )
        .route(
            "/api/fertilizer/soil-test/:farm_id",
            get(soil::get_soil_tests_axum).post(soil::upload_soil_test_axum),
        )
        .route(
            "/api/fertilizer/application/log",
            post(fertilizer::log_application_axum),
        )
        .route("/api/fertilizer/search", get(fertilizer::search_fertilizers_axum))
}
