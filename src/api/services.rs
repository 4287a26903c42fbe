use super::common::failure;
use crate::proxy::RelayError;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// 转发 `/services`，并写入 author 字段（覆盖上游同名字段）
pub async fn list_services(State(state): State<Arc<AppState>>) -> Response {
    match state.upstream.fetch_services().await {
        Ok(upstream) => Json(with_author(upstream, state.author())).into_response(),
        Err(e) => {
            tracing::error!("Error fetching services: {}", e);
            failure(RelayError::ServicesUnavailable, state.author())
        }
    }
}

fn with_author(mut body: Map<String, Value>, author: &str) -> Value {
    body.insert("author".to_string(), Value::String(author.to_string()));
    Value::Object(body)
}
