//! 媒体流转发
//! 原样转发上游数据块，统计字节数并在结束、出错或客户端断开时记录日志

use bytes::Bytes;
use futures::Stream;
use pin_project::{pin_project, pinned_drop};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::error::classify_upstream_error;

#[pin_project(PinnedDrop)]
pub struct RelayStream<S> {
    #[pin]
    inner: S,
    label: String,
    bytes_relayed: u64,
    started: bool,
    finished: bool,
}

impl<S> RelayStream<S> {
    pub fn new(inner: S, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
            bytes_relayed: 0,
            started: false,
            finished: false,
        }
    }
}

impl<S> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>>,
{
    type Item = Result<Bytes, reqwest::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.finished {
            return Poll::Ready(None);
        }
        *this.started = true;

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                *this.bytes_relayed += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                // 响应头已发送，只能中断连接
                *this.finished = true;
                tracing::warn!(
                    "Media stream {} failed after {} bytes ({}): {}",
                    this.label,
                    this.bytes_relayed,
                    classify_upstream_error(&e),
                    e
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                *this.finished = true;
                tracing::debug!(
                    "Media stream {} completed, {} bytes relayed",
                    this.label,
                    this.bytes_relayed
                );
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[pinned_drop]
impl<S> PinnedDrop for RelayStream<S> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if !*this.started {
            // HEAD 请求等场景：响应体从未被读取
            tracing::debug!("Media stream {} dropped before relaying", this.label);
        } else if !*this.finished {
            tracing::info!(
                "Client disconnected from {} after {} bytes, releasing upstream",
                this.label,
                this.bytes_relayed
            );
        }
    }
}
