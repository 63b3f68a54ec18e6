//! Search engine result scraping: rank position and backlinks.

use axum::Json;
use axum::extract::{RawQuery, State};

use amplifyx_core::search::{extract_backlinks, rank_position};
use amplifyx_core::{Backlinks, RankPosition};

use super::{required_url, single_param};
use crate::error::ApiError;
use crate::state::SharedState;

/// GET /rank-check
pub async fn rank_check(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<RankPosition>, ApiError> {
    let raw = query.as_deref();
    let (Some(search), Some(domain)) = (single_param(raw, "query"), single_param(raw, "domain"))
    else {
        return Err(ApiError::MissingParam("Missing query or domain"));
    };

    let failed = |e: anyhow::Error| ApiError::upstream("Failed to check rank", e);
    let search_url = state.search.rank_query_url(&search).map_err(failed)?;
    let html = state
        .fetcher
        .get_text_as_browser(&search_url)
        .await
        .map_err(failed)?;

    Ok(Json(RankPosition {
        position: rank_position(&html, &domain),
    }))
}

/// GET /backlink-check
pub async fn backlink_check(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Backlinks>, ApiError> {
    let url = required_url(query.as_deref())?;

    let failed = |e: anyhow::Error| ApiError::upstream("Failed to fetch backlinks", e);
    let search_url = state.search.backlink_query_url(&url).map_err(failed)?;
    let html = state
        .fetcher
        .get_text_as_browser(&search_url)
        .await
        .map_err(failed)?;

    Ok(Json(Backlinks {
        backlinks: extract_backlinks(&html),
    }))
}
