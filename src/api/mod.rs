pub mod analyze;
pub mod health;

use crate::analysis::Analyzer;
use crate::config::Config;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analyzer: Analyzer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let analyzer = Analyzer::new(config.policy());
        Self { config, analyzer }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/analyze", post(analyze::analyze))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}
