use crate::state::AppState;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod common;
mod download;
mod logs;
mod services;

pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Logs
        .route("/api/logs", get(logs::get_request_logs))
        // Upstream proxy
        .route("/api/services", get(services::list_services))
        .route("/api/download", get(download::download_video))
        // Health
        .route("/healthz", get(|| async { "ok" }))
        .fallback(common::not_found)
        .with_state(state)
}

/// 完整应用：路由 + 请求日志 + CORS
pub fn build_app(state: Arc<AppState>) -> Router {
    build_routes(state.clone())
        .layer(middleware::from_fn_with_state(state, common::request_logger))
        .layer(CorsLayer::permissive())
}
