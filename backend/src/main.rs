use axum::{middleware::from_fn_with_state, routing::get, Router};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;
mod error;
mod middleware;
mod ml;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod api_tests;

use config::AppConfig;
use error::KrishiResult;
use ml::MlClient;
use state::AppState;
use store::PgStore;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting KrishiMitra Backend...");

    if let Err(e) = run(AppConfig::from_env()).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> KrishiResult<()> {
    let pool = db::init_pool(&config.database_url).await?;
    if let Err(e) = db::init_database(&pool).await {
        tracing::error!("Failed to run migrations: {}", e);
    }

    let ml = MlClient::new(&config.ml_service_url, config.ml_timeout)?;
    tracing::info!(
        "Recommendation service at {} (timeout {:?})",
        config.ml_service_url,
        config.ml_timeout
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, Arc::new(PgStore::new(pool)), Arc::new(ml))?;
    let app = build_app(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(routes::create_router())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "KrishiMitra API is running"
}
