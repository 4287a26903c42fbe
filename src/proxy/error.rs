// 错误模块 - 上游错误分类与对外错误类型
use axum::http::StatusCode;
use thiserror::Error;

/// 对外暴露的错误，每种错误对应固定的状态码与提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Missing video URL parameter.")]
    MissingVideoUrl,
    #[error("Access denied: Invalid or missing API key.")]
    Unauthorized,
    #[error("Video data not found or unsupported format.")]
    VideoNotFound,
    #[error("Failed to fetch services from external API.")]
    ServicesUnavailable,
    #[error("Failed to process video download.")]
    DownloadFailed,
    #[error("Route not found.")]
    RouteNotFound,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingVideoUrl => StatusCode::BAD_REQUEST,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::VideoNotFound | RelayError::RouteNotFound => StatusCode::NOT_FOUND,
            RelayError::ServicesUnavailable | RelayError::DownloadFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// 上游调用失败（只记录日志，不透传给客户端）
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{kind}: {source}")]
    Request {
        kind: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("invalid upstream body: {0}")]
    Decode(String),
    #[error("invalid upstream URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("upstream did not answer within {0}s")]
    Timeout(u64),
    #[error("upstream body is not a JSON object")]
    NotAnObject,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return UpstreamError::Status {
                status: status.as_u16(),
                url: error
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
            };
        }
        UpstreamError::Request {
            kind: classify_upstream_error(&error),
            source: error,
        }
    }
}

/// 分类 reqwest 错误，用于日志
pub fn classify_upstream_error(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout_error"
    } else if error.is_connect() {
        "connection_error"
    } else if error.is_decode() {
        "decode_error"
    } else if error.is_body() {
        "stream_error"
    } else if error.is_status() {
        "status_error"
    } else {
        "unknown_error"
    }
}
