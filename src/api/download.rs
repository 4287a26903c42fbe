use super::common::{failure, single_param, QueryPairs};
use crate::proxy::{RelayError, RelayStream, UpstreamError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

const DEFAULT_CONTENT_TYPE: &str = "video/mp4";
const DEFAULT_FILENAME: &str = "download.mp4";

/// 解析视频地址并把媒体文件以流的方式转发给客户端
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Response {
    let Some(video_url) = single_param(&params, "url").filter(|u| !u.is_empty()) else {
        return failure(RelayError::MissingVideoUrl, state.author());
    };

    match relay_video(&state, video_url).await {
        Ok(response) => response,
        Err(DownloadFailure::NotVideo) => {
            tracing::info!("No downloadable video for {}", video_url);
            failure(RelayError::VideoNotFound, state.author())
        }
        Err(DownloadFailure::Upstream(e)) => {
            tracing::error!("Error downloading video {}: {}", video_url, e);
            failure(RelayError::DownloadFailed, state.author())
        }
    }
}

enum DownloadFailure {
    NotVideo,
    Upstream(UpstreamError),
}

impl From<UpstreamError> for DownloadFailure {
    fn from(e: UpstreamError) -> Self {
        DownloadFailure::Upstream(e)
    }
}

/// 所有可能失败的步骤都在构造响应之前完成；
/// 返回 Ok 之后只剩流式转发，出错时直接中断连接
async fn relay_video(state: &AppState, video_url: &str) -> Result<Response, DownloadFailure> {
    let metadata = state.upstream.resolve_download(video_url).await?;
    if !metadata.is_video() {
        return Err(DownloadFailure::NotVideo);
    }

    let media_url = metadata
        .download_url()
        .ok_or_else(|| UpstreamError::Decode("video metadata has no download URL".to_string()))?;
    let media = state.upstream.open_media(media_url).await?;

    let content_type = media
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let content_length = media.headers().get(header::CONTENT_LENGTH).cloned();
    let disposition = content_disposition(metadata.filename().unwrap_or(DEFAULT_FILENAME));

    tracing::info!("Streaming {} for {}", media_url, video_url);
    let body = Body::from_stream(RelayStream::new(media.bytes_stream(), media_url));

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, length);
    }
    Ok(response)
}

/// `attachment; filename="..."`，去掉会破坏头部的字符
fn content_disposition(filename: &str) -> HeaderValue {
    let cleaned: String = filename
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();
    let name = if cleaned.is_empty() { DEFAULT_FILENAME } else { cleaned };

    HeaderValue::from_bytes(format!("attachment; filename=\"{}\"", name).as_bytes())
        .unwrap_or_else(|_| {
            HeaderValue::from_static("attachment; filename=\"download.mp4\"")
        })
}
