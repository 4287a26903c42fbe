//! 上游 API 客户端
//! 封装 `/services`、`/down` 与媒体文件请求

use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use super::error::UpstreamError;
use crate::config::RelayConfig;

const CONNECT_TIMEOUT_SECS: u64 = 15;

/// `/down` 接口返回的元数据
///
/// 上游字段类型不稳定，保留原始 JSON，按需读取
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct DownloadMetadata(Value);

impl DownloadMetadata {
    /// status 为真值且类型为 video 时才可下载
    pub fn is_video(&self) -> bool {
        self.0.get("status").is_some_and(is_truthy)
            && self.0.pointer("/data/type").and_then(Value::as_str) == Some("video")
    }

    fn media_str(&self, field: &str) -> Option<&str> {
        self.0
            .pointer("/data/media")
            .and_then(|media| media.get(field))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn download_url(&self) -> Option<&str> {
        self.media_str("download")
    }

    pub fn filename(&self) -> Option<&str> {
        self.media_str("filename")
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 上游客户端（共享连接池）
pub struct UpstreamClient {
    client: reqwest::Client,
    base: Url,
    request_timeout: Option<Duration>,
}

impl UpstreamClient {
    pub fn new(config: &RelayConfig) -> Result<Self, String> {
        let base = config.upstream_base_url()?;

        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS));

        // 未显式配置时不读取系统代理环境变量
        builder = match config.upstream_proxy.as_deref().filter(|p| !p.is_empty()) {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| format!("Invalid upstream proxy {:?}: {}", proxy_url, e))?;
                tracing::info!("Routing upstream traffic through {}", proxy_url);
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let request_timeout = match config.request_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            client,
            base,
            request_timeout,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// 拼接上游路径，保留 base 自带的路径前缀
    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        let joined = format!("{}/{}", self.base.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|source| UpstreamError::InvalidUrl {
            url: joined,
            source,
        })
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match self.request_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// 获取可用服务列表
    pub async fn fetch_services(&self) -> Result<Map<String, Value>, UpstreamError> {
        let url = self.endpoint("services")?;
        tracing::debug!("Fetching services from {}", url);

        let response = self.get(url).send().await?.error_for_status()?;
        let body: Value = response.json().await?;

        match body {
            Value::Object(map) => Ok(map),
            _ => Err(UpstreamError::NotAnObject),
        }
    }

    /// 通过 `/down` 解析视频元数据
    pub async fn resolve_download(&self, target: &str) -> Result<DownloadMetadata, UpstreamError> {
        let mut url = self.endpoint("down")?;
        url.query_pairs_mut().append_pair("url", target);
        tracing::debug!("Resolving download via {}", url);

        let response = self.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        serde_json::from_slice::<Value>(&bytes)
            .map(DownloadMetadata)
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// 请求媒体文件；只等待响应头，body 以流的方式读取
    pub async fn open_media(&self, media_url: &str) -> Result<reqwest::Response, UpstreamError> {
        let url = Url::parse(media_url).map_err(|source| UpstreamError::InvalidUrl {
            url: media_url.to_string(),
            source,
        })?;

        // 超时只作用于等待响应头，避免截断长视频
        let send = self.client.get(url).send();
        let response = match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, send)
                .await
                .map_err(|_| UpstreamError::Timeout(timeout.as_secs()))??,
            None => send.await?,
        };

        Ok(response.error_for_status()?)
    }
}
