use super::common::{failure, single_param, QueryPairs};
use crate::proxy::{RelayError, RequestLogEntry};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse<'a> {
    pub status: bool,
    pub author: &'a str,
    pub log_count: usize,
    pub logs: Vec<RequestLogEntry>,
}

pub async fn get_request_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Response {
    if single_param(&params, "key") != Some(state.config.log_access_key.as_str()) {
        tracing::warn!("Rejected log access with invalid or missing key");
        return failure(RelayError::Unauthorized, state.author());
    }

    // 快照在锁内一次性复制，计数与内容保持一致
    let logs = state.log_store.snapshot();
    Json(LogsResponse {
        status: true,
        author: state.author(),
        log_count: logs.len(),
        logs,
    })
    .into_response()
}
