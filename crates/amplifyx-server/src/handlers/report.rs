use axum::Json;
use axum::extract::{RawQuery, State};

use amplifyx_core::WebsiteSeoReport;
use amplifyx_core::report::analyze_website;

use super::required_url;
use crate::error::ApiError;
use crate::state::SharedState;

/// GET /seo-report
pub async fn seo_report(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<WebsiteSeoReport>, ApiError> {
    let url = required_url(query.as_deref())?;
    let report = analyze_website(&state.fetcher, &url)
        .await
        .map_err(|e| ApiError::upstream("Failed to build SEO report", e))?;

    Ok(Json(report))
}
