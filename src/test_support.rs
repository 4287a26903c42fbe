//! 测试辅助：本地假上游 + 路由调用工具

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Request, StatusCode},
    response::Response,
    routing::get as get_route,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use crate::api::build_app;
use crate::config::RelayConfig;
use crate::state::AppState;

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Vec<u8>,
}

impl Canned {
    fn json(status: StatusCode, value: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: serde_json::to_vec(&value).unwrap(),
        }
    }

    fn into_response(self) -> Response {
        let mut builder = Response::builder().status(self.status);
        if let Some(content_type) = self.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(self.body)).unwrap()
    }
}

#[derive(Default)]
struct FakeState {
    services: Mutex<Option<Canned>>,
    down: Mutex<Option<Canned>>,
    media: Mutex<Option<Canned>>,
    last_down_target: Mutex<Option<String>>,
    services_calls: AtomicUsize,
    down_calls: AtomicUsize,
    media_calls: AtomicUsize,
}

fn canned_or_default(slot: &Mutex<Option<Canned>>) -> Response {
    slot.lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| Canned::json(StatusCode::NOT_FOUND, json!({ "error": "unset" })))
        .into_response()
}

/// 在 127.0.0.1 随机端口上运行的假上游
pub struct FakeUpstream {
    pub base: String,
    state: Arc<FakeState>,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let router = Router::new()
            .route(
                "/services",
                get_route(|State(s): State<Arc<FakeState>>| async move {
                    s.services_calls.fetch_add(1, Ordering::SeqCst);
                    canned_or_default(&s.services)
                }),
            )
            .route(
                "/down",
                get_route(
                    |State(s): State<Arc<FakeState>>,
                     Query(q): Query<HashMap<String, String>>| async move {
                        s.down_calls.fetch_add(1, Ordering::SeqCst);
                        *s.last_down_target.lock().unwrap() = q.get("url").cloned();
                        canned_or_default(&s.down)
                    },
                ),
            )
            .route(
                "/media/clip",
                get_route(|State(s): State<Arc<FakeState>>| async move {
                    s.media_calls.fetch_add(1, Ordering::SeqCst);
                    canned_or_default(&s.media)
                }),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            state,
        }
    }

    pub fn media_url(&self) -> String {
        format!("{}/media/clip", self.base)
    }

    pub fn set_services(&self, status: StatusCode, body: Value) {
        *self.state.services.lock().unwrap() = Some(Canned::json(status, body));
    }

    pub fn set_down(&self, status: StatusCode, body: Value) {
        *self.state.down.lock().unwrap() = Some(Canned::json(status, body));
    }

    pub fn set_media(&self, status: StatusCode, content_type: Option<&'static str>, body: Vec<u8>) {
        *self.state.media.lock().unwrap() = Some(Canned {
            status,
            content_type,
            body,
        });
    }

    pub fn services_calls(&self) -> usize {
        self.state.services_calls.load(Ordering::SeqCst)
    }

    pub fn down_calls(&self) -> usize {
        self.state.down_calls.load(Ordering::SeqCst)
    }

    pub fn media_calls(&self) -> usize {
        self.state.media_calls.load(Ordering::SeqCst)
    }

    pub fn last_down_target(&self) -> Option<String> {
        self.state.last_down_target.lock().unwrap().clone()
    }
}

/// 声明 `advertised_len` 字节，但只发送 `sent` 后就关闭连接的媒体服务器
pub async fn start_truncated_media(advertised_len: usize, sent: &'static [u8]) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\n\r\n",
                advertised_len
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(sent).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/truncated.mp4", addr)
}

pub fn test_config(upstream_base: &str) -> RelayConfig {
    RelayConfig {
        upstream_base: upstream_base.to_string(),
        author: "@tester".to_string(),
        log_access_key: "secret".to_string(),
        request_timeout: 10,
        ..RelayConfig::default()
    }
}

pub fn test_app(upstream_base: &str) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(test_config(upstream_base)).unwrap());
    (build_app(state.clone()), state)
}

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
