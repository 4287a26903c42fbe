//! 请求日志存储
//! 使用内存环形缓冲区存储最近的请求

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 默认保留的日志条数
pub const DEFAULT_CAPACITY: usize = 1000;

/// 请求日志条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub method: String,
    /// 包含查询字符串
    pub path: String,
    pub client_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl RequestLogEntry {
    /// 以当前时间创建日志条目
    pub fn now(
        method: impl Into<String>,
        path: impl Into<String>,
        client_address: impl Into<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            method: method.into(),
            path: path.into(),
            client_address: client_address.into(),
            user_agent,
        }
    }
}

/// 日志存储（环形缓冲区）
pub struct LogStore {
    logs: RwLock<VecDeque<RequestLogEntry>>,
    max_size: usize,
}

impl LogStore {
    /// 创建新的日志存储
    pub fn new(max_size: usize) -> Self {
        Self {
            logs: RwLock::new(VecDeque::with_capacity(max_size)),
            max_size,
        }
    }

    /// 记录一条日志
    pub fn record(&self, entry: RequestLogEntry) {
        tracing::info!(
            "[{}] {} {} from {}",
            entry.timestamp,
            entry.method,
            entry.path,
            entry.client_address
        );

        if self.max_size == 0 {
            return;
        }

        let mut logs = self.write();

        // 如果超过最大容量，移除最旧的
        if logs.len() >= self.max_size {
            logs.pop_front();
        }

        logs.push_back(entry);
    }

    /// 获取当前日志快照（最新的在前）
    pub fn snapshot(&self) -> Vec<RequestLogEntry> {
        self.read().iter().rev().cloned().collect()
    }

    /// 获取日志总数
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // 写入方 panic 不会让缓冲区失效，直接沿用内部数据
    fn read(&self) -> RwLockReadGuard<'_, VecDeque<RequestLogEntry>> {
        self.logs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<RequestLogEntry>> {
        self.logs.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY) // 默认保留 1000 条
    }
}
