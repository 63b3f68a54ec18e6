use axum::Json;
use axum::extract::{RawQuery, State};

use amplifyx_core::url_utils::is_http_url;
use amplifyx_core::{AuditError, PageSpeedReport};

use super::single_param;
use crate::error::ApiError;
use crate::state::SharedState;

/// GET /pagespeed
pub async fn pagespeed(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<PageSpeedReport>, ApiError> {
    let url = single_param(query.as_deref(), "url")
        .ok_or(ApiError::MissingParam("Missing or invalid url"))?;

    if !is_http_url(&url) {
        return Err(ApiError::InvalidInput("Invalid URL format"));
    }

    match state.auditor.audit(&url).await {
        Ok(report) => Ok(Json(report)),
        Err(e @ AuditError::NoResult) => {
            Err(ApiError::upstream("Lighthouse returned no result.", e))
        }
        Err(e) => Err(ApiError::upstream("Failed to run Lighthouse audit.", e)),
    }
}
