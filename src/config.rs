//! 中继服务配置

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_UPSTREAM_BASE: &str = "https://tele-social.vercel.app";
pub const DEFAULT_AUTHOR: &str = "@TheVextro";
pub const DEFAULT_LOG_ACCESS_KEY: &str = "m2h";
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 120;

/// 中继服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// 监听端口
    pub port: u16,

    /// 监听地址
    pub bind_address: String,

    /// 上游 API 根地址
    pub upstream_base: String,

    /// 写入每个响应的 author 字段
    pub author: String,

    /// 读取日志所需的密钥 (精确比较, 不是安全凭证)
    pub log_access_key: String,

    /// 上游代理 (http/https/socks5)
    #[serde(default)]
    pub upstream_proxy: Option<String>,

    /// 上游元数据请求超时时间(秒), 0 表示不限制
    pub request_timeout: u64,
}

impl RelayConfig {
    /// 解析上游根地址; 只接受 http/https 绝对地址
    pub fn upstream_base_url(&self) -> Result<Url, String> {
        let url = Url::parse(&self.upstream_base)
            .map_err(|e| format!("Invalid upstream base {:?}: {}", self.upstream_base, e))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(format!(
                "Unsupported upstream scheme {:?} in {:?}",
                other, self.upstream_base
            )),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            upstream_base: DEFAULT_UPSTREAM_BASE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            log_access_key: DEFAULT_LOG_ACCESS_KEY.to_string(),
            upstream_proxy: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
