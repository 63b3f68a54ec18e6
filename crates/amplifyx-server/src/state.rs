//! Shared application state for the API server.

use std::sync::Arc;

use amplifyx_core::usage::{DailyQuota, JsonFileUsageStore, MemoryUsageStore, SystemClock, UsageStore};
use amplifyx_core::{HttpFetcher, LighthouseAuditor, PageAuditor, SearchEndpoints};
use tracing::info;

use crate::config::ServerConfig;

/// State injected into every handler
pub struct AppState {
    pub fetcher: HttpFetcher,
    pub search: SearchEndpoints,
    pub auditor: Arc<dyn PageAuditor>,
    /// Shared with blocking tasks; the file store does synchronous I/O
    pub quota: Arc<DailyQuota>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        fetcher: HttpFetcher,
        search: SearchEndpoints,
        auditor: Arc<dyn PageAuditor>,
        quota: DailyQuota,
    ) -> Self {
        Self {
            fetcher,
            search,
            auditor,
            quota: Arc::new(quota),
        }
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(config.request_timeout())?;

        let search = SearchEndpoints {
            web_search: config.web_search_url.clone(),
            backlink_search: config.backlink_search_url.clone(),
        };

        let auditor = LighthouseAuditor::new(&config.lighthouse_bin)
            .with_chrome_path(config.chrome_path.clone())
            .with_timeout(config.audit_timeout());

        let store: Box<dyn UsageStore> = match &config.usage_store {
            Some(path) => {
                info!(path = %path.display(), "persisting daily usage to file");
                Box::new(JsonFileUsageStore::new(path))
            }
            None => Box::new(MemoryUsageStore::default()),
        };
        let quota = DailyQuota::new(store, Arc::new(SystemClock), config.daily_word_limit);

        Ok(Self::new(fetcher, search, Arc::new(auditor), quota))
    }
}
