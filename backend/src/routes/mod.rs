use crate::state::AppState;
use axum::Router;

pub mod crop;
pub mod farm;
pub mod fertilizer;
pub mod online;
pub mod system;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(system::router())
        .merge(online::router())
        .merge(farm::router())
        .merge(crop::router())
        .merge(fertilizer::router())
}
