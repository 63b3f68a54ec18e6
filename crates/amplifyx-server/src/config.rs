use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use amplifyx_core::search::{DEFAULT_BACKLINK_SEARCH, DEFAULT_WEB_SEARCH};
use amplifyx_core::usage::DAILY_WORD_LIMIT;

/// AmplifyX SEO API server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Interface to bind: an IP literal or a resolvable host name
    #[arg(long, env = "AMPLIFYX_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Timeout for every outbound page fetch, in seconds
    #[arg(long, env = "AMPLIFYX_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Upper bound on one lighthouse run, in seconds
    #[arg(long, env = "AMPLIFYX_AUDIT_TIMEOUT", default_value_t = 120)]
    pub audit_timeout_secs: u64,

    #[arg(long, env = "LIGHTHOUSE_BIN", default_value = "lighthouse")]
    pub lighthouse_bin: PathBuf,

    /// Chrome binary handed to lighthouse
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    #[arg(long, env = "AMPLIFYX_WEB_SEARCH_URL", default_value = DEFAULT_WEB_SEARCH)]
    pub web_search_url: String,

    #[arg(long, env = "AMPLIFYX_BACKLINK_SEARCH_URL", default_value = DEFAULT_BACKLINK_SEARCH)]
    pub backlink_search_url: String,

    /// JSON file for daily usage records; kept in memory when unset
    #[arg(long, env = "AMPLIFYX_USAGE_STORE")]
    pub usage_store: Option<PathBuf>,

    #[arg(long, env = "AMPLIFYX_DAILY_WORD_LIMIT", default_value_t = DAILY_WORD_LIMIT)]
    pub daily_word_limit: u32,
}

impl ServerConfig {
    /// Resolve `host` and `port` to the first matching socket address
    pub async fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        tokio::net::lookup_host((host, self.port))
            .await
            .with_context(|| format!("invalid bind host {}", self.host))?
            .next()
            .with_context(|| format!("bind host {} resolved to no address", self.host))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn audit_timeout(&self) -> Duration {
        Duration::from_secs(self.audit_timeout_secs)
    }
}
