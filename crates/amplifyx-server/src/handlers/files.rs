//! robots.txt and sitemap.xml passthrough.
//!
//! Any failure, including a URL that cannot be resolved, is reported as 404.

use axum::Json;
use axum::extract::{RawQuery, State};
use tracing::debug;

use amplifyx_core::url_utils::resolve_site_file;
use amplifyx_core::{HttpFetcher, RobotsFile, SitemapFile};

use super::required_url;
use crate::error::ApiError;
use crate::state::SharedState;

async fn fetch_site_file(fetcher: &HttpFetcher, url: &str, path: &str) -> Option<String> {
    let target = resolve_site_file(url, path).ok()?;
    match fetcher.get_text(&target).await {
        Ok(body) => Some(body),
        Err(e) => {
            debug!(url = %target, error = %e, "site file unavailable");
            None
        }
    }
}

/// GET /robots-check
pub async fn robots_check(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<RobotsFile>, ApiError> {
    let url = required_url(query.as_deref())?;
    let robots = fetch_site_file(&state.fetcher, &url, "/robots.txt")
        .await
        .ok_or(ApiError::NotFound("robots.txt not found"))?;

    Ok(Json(RobotsFile { robots }))
}

/// GET /sitemap-check
pub async fn sitemap_check(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<SitemapFile>, ApiError> {
    let url = required_url(query.as_deref())?;
    let sitemap = fetch_site_file(&state.fetcher, &url, "/sitemap.xml")
        .await
        .ok_or(ApiError::NotFound("sitemap.xml not found"))?;

    Ok(Json(SitemapFile { sitemap }))
}
