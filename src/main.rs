use anyhow::Context;
use clap::Parser;
use media_relay_server::api::build_app;
use media_relay_server::config::{self, RelayConfig};
use media_relay_server::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    #[arg(long, env = "BIND_ADDRESS", default_value = config::DEFAULT_BIND_ADDRESS)]
    bind_address: String,

    /// Base URL of the upstream API
    #[arg(long, env = "EXTERNAL_API_BASE", default_value = config::DEFAULT_UPSTREAM_BASE)]
    upstream_base: String,

    /// Value of the `author` field added to every response
    #[arg(long, env = "AUTHOR_NAME", default_value = config::DEFAULT_AUTHOR)]
    author: String,

    /// Shared key for `/api/logs` (plain string comparison)
    #[arg(long, env = "LOG_ACCESS_KEY", default_value = config::DEFAULT_LOG_ACCESS_KEY)]
    log_access_key: String,

    /// Optional http/https/socks5 proxy for upstream traffic
    #[arg(long, env = "UPSTREAM_PROXY")]
    upstream_proxy: Option<String>,

    /// Upstream metadata timeout in seconds, 0 disables it
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = config::DEFAULT_REQUEST_TIMEOUT)]
    request_timeout: u64,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            bind_address: args.bind_address,
            upstream_base: args.upstream_base,
            author: args.author,
            log_access_key: args.log_access_key,
            upstream_proxy: args.upstream_proxy,
            request_timeout: args.request_timeout,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from(Args::parse());
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, config.port))?;

    let state = AppState::new(config).map_err(anyhow::Error::msg)?;
    tracing::info!("Upstream API: {}", state.upstream.base());
    let app = build_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Proxy server listening at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
