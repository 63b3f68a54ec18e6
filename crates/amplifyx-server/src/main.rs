//! AmplifyX API server
//!
//! Run with: cargo run -p amplifyx-server -- --port 5000

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use amplifyx_server::{AppState, ServerConfig, build_router};

const DEFAULT_LOG_FILTER: &str = "amplifyx=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.bind_addr().await?;

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "SEO API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
