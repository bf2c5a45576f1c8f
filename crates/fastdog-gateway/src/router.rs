//! Axum router wiring.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;
use crate::{handlers, ops};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.cfg().gateway.max_body_bytes;

    Router::new()
        .route("/v1/models/:name/binary", get(handlers::models::model_binary))
        .route("/v1/models/:name/info", get(handlers::models::model_info))
        .route("/v1/models/:name/manifest", get(handlers::models::model_manifest))
        .route("/v1/cache/stats", get(handlers::models::cache_stats))
        .route("/v1/cache/clear", post(handlers::models::cache_clear))
        .route("/v1/decode", post(handlers::decode::decode))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
