//! Handlers that fetch one page and extract fields from its HTML.

use axum::Json;
use axum::extract::{RawQuery, State};

use amplifyx_core::keywords::keyword_density as top_keywords;
use amplifyx_core::meta::extract_meta_tags;
use amplifyx_core::parser::{summarize_page, visible_body_text};
use amplifyx_core::tech_stack::detect_tech_stack;
use amplifyx_core::{KeywordDensity, MetaTags, PageSummary, TechStack};

use super::required_url;
use crate::error::ApiError;
use crate::state::SharedState;

/// GET /analyze-page
pub async fn analyze_page(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<PageSummary>, ApiError> {
    let url = required_url(query.as_deref())?;
    let html = state
        .fetcher
        .get_text(&url)
        .await
        .map_err(|e| ApiError::upstream("Failed to analyze page", e))?;

    Ok(Json(summarize_page(&html)))
}

/// GET /keyword-density
pub async fn keyword_density(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<KeywordDensity>, ApiError> {
    let url = required_url(query.as_deref())?;
    let html = state
        .fetcher
        .get_text(&url)
        .await
        .map_err(|e| ApiError::upstream("Failed to analyze keyword density", e))?;

    let keywords = top_keywords(&visible_body_text(&html));
    Ok(Json(KeywordDensity { keywords }))
}

/// GET /meta-check
pub async fn meta_check(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<MetaTags>, ApiError> {
    let url = required_url(query.as_deref())?;
    let html = state
        .fetcher
        .get_text(&url)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch meta tags", e))?;

    Ok(Json(extract_meta_tags(&html)))
}

/// GET /tech-stack
pub async fn tech_stack(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<TechStack>, ApiError> {
    let url = required_url(query.as_deref())?;
    let html = state
        .fetcher
        .get_text(&url)
        .await
        .map_err(|e| ApiError::upstream("Failed to detect tech stack", e))?;

    Ok(Json(TechStack {
        stack: detect_tech_stack(&html),
    }))
}
