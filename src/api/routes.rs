use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::*;
use super::AppState;
use crate::config::Config;

pub fn create_router(config: &Config) -> Router {
    let state = Arc::new(AppState::from_config(config));

    Router::new()
        .route("/health", get(health))
        .route("/api/convert/itm-to-wgs84", get(itm_to_wgs84))
        .route("/api/convert/wgs84-to-itm", get(wgs84_to_itm))
        .route("/api/export/litchi", post(export_litchi))
        .route("/api/overlay", post(render_overlay))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // survey imagery
                .layer(CorsLayer::permissive()),
        )
}
