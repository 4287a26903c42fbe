use crate::config::RelayConfig;
use crate::proxy::{LogStore, UpstreamClient};
use std::sync::Arc;

/// 应用状态，通过 axum `State` 注入到每个处理器
pub struct AppState {
    pub config: RelayConfig,
    pub log_store: Arc<LogStore>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, String> {
        Self::with_log_store(config, Arc::new(LogStore::default()))
    }

    pub fn with_log_store(config: RelayConfig, log_store: Arc<LogStore>) -> Result<Self, String> {
        let upstream = Arc::new(UpstreamClient::new(&config)?);
        Ok(Self {
            config,
            log_store,
            upstream,
        })
    }

    pub fn author(&self) -> &str {
        &self.config.author
    }
}
