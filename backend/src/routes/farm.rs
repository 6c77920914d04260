use crate::commands::farm;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/farms",
        get(farm::get_my_farms_axum).post(farm::add_farm_axum),
    )
}
