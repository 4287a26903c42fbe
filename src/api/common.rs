use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::proxy::{RelayError, RequestLogEntry};
use crate::state::AppState;

const UNKNOWN_CLIENT: &str = "unknown";

/// 失败响应包装
#[derive(Serialize)]
pub struct FailureBody<'a> {
    pub status: bool,
    pub message: String,
    pub author: &'a str,
}

/// 把错误渲染为 `{status:false, message, author}`
pub fn failure(error: RelayError, author: &str) -> Response {
    let body = FailureBody {
        status: false,
        message: error.to_string(),
        author,
    };
    (error.status_code(), Json(body)).into_response()
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    failure(RelayError::RouteNotFound, state.author())
}

/// 记录每个入站请求，然后交给路由处理
pub async fn request_logger(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let entry = RequestLogEntry::now(
        req.method().as_str(),
        path_and_query(req.uri()),
        client_address(req.headers(), peer),
        header_string(req.headers(), header::USER_AGENT.as_str()),
    );
    state.log_store.record(entry);

    next.run(req).await
}

/// 查询参数原样列表，重复参数不会在提取阶段被拒绝
pub type QueryPairs = Vec<(String, String)>;

/// 只出现一次的查询参数；缺失或重复都视为无效
pub fn single_param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let mut values = pairs.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str());
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value),
        _ => None,
    }
}

fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// 优先使用 x-forwarded-for，否则使用连接对端地址
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    header_string(headers, "x-forwarded-for")
        .filter(|v| !v.trim().is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}
