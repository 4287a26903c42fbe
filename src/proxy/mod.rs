// proxy 模块 - 上游转发与请求日志

pub mod error;
pub mod log_store;
pub mod relay_stream;
pub mod upstream;

pub use error::{RelayError, UpstreamError};
pub use log_store::{LogStore, RequestLogEntry};
pub use relay_stream::RelayStream;
pub use upstream::{DownloadMetadata, UpstreamClient};
