//! Daily word quota, content rewriting and keyword analytics for the content
//! tools.
//!
//! Quota operations can hit the file store, so they run on the blocking pool.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{RawQuery, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use amplifyx_core::mock::{KeywordAnalytic, keyword_analytics as seeded_keywords};
use amplifyx_core::parser::count_words;
use amplifyx_core::rewrite::{
    DEFAULT_STYLE, DEFAULT_TONE, Platform, RewriteOptions, estimate_words, rewrite_content,
};
use amplifyx_core::usage::ANONYMOUS_CLIENT;
use amplifyx_core::{DailyQuota, DailyUsage, UsageError};

use super::single_param;
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RecordUsage {
    pub client: Option<String>,
    pub words: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub keywords: Vec<KeywordAnalytic>,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub client: Option<String>,
    pub content: Option<String>,
    pub platform: Option<String>,
    pub tone: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub content: String,
    pub platform: Platform,
    pub words_used: u32,
    pub usage: DailyUsage,
    pub keywords: Vec<KeywordAnalytic>,
}

fn client_key(client: Option<String>) -> String {
    client
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Run a quota operation on the blocking pool
async fn with_quota<T, F>(state: &SharedState, op: F) -> Result<Result<T, UsageError>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&DailyQuota) -> Result<T, UsageError> + Send + 'static,
{
    let quota = Arc::clone(&state.quota);
    tokio::task::spawn_blocking(move || op(&quota))
        .await
        .map_err(|e| ApiError::upstream("Usage store task failed", e))
}

fn quota_error(client: &str, error: UsageError, message: &'static str) -> ApiError {
    match error {
        UsageError::LimitReached { used, requested, .. } => {
            debug!(client, used, requested, "daily limit reached");
            ApiError::LimitReached
        }
        e => ApiError::upstream(message, e),
    }
}

/// GET /usage
pub async fn get_usage(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<DailyUsage>, ApiError> {
    let client = client_key(single_param(query.as_deref(), "client"));

    let usage = with_quota(&state, move |quota| quota.usage(&client))
        .await?
        .map_err(|e| ApiError::upstream("Failed to read usage", e))?;

    Ok(Json(usage))
}

/// POST /usage
pub async fn record_usage(
    State(state): State<SharedState>,
    payload: Result<Json<RecordUsage>, JsonRejection>,
) -> Result<Json<DailyUsage>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected usage body");
        ApiError::InvalidInput("Missing words")
    })?;

    let client = client_key(request.client);
    let words = request.words;

    let key = client.clone();
    let usage = with_quota(&state, move |quota| quota.record(&key, words))
        .await?
        .map_err(|e| quota_error(&client, e, "Failed to record usage"))?;

    Ok(Json(usage))
}

/// POST /rewrite
///
/// Reserves the estimated size first, then charges the words actually
/// produced.
pub async fn rewrite(
    State(state): State<SharedState>,
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Json<RewriteResponse>, ApiError> {
    let request = payload
        .map(|Json(request)| request)
        .map_err(|_| ApiError::MissingParam("Missing content"))?;

    let content = non_blank(request.content).ok_or(ApiError::MissingParam("Missing content"))?;

    let platform = match non_blank(request.platform) {
        Some(platform) => platform
            .parse::<Platform>()
            .map_err(|_| ApiError::InvalidInput("Unsupported platform"))?,
        None => Platform::default(),
    };

    let options = RewriteOptions {
        platform,
        tone: non_blank(request.tone).unwrap_or_else(|| DEFAULT_TONE.to_string()),
        style: non_blank(request.style).unwrap_or_else(|| DEFAULT_STYLE.to_string()),
    };

    let client = client_key(request.client);
    let estimate = estimate_words(&content);
    let keywords = seeded_keywords(&content);

    let key = client.clone();
    let (rewritten, words_used, usage) = with_quota(&state, move |quota| {
        if !quota.can_consume(&key, estimate)? {
            let used = quota.usage(&key)?.words_used;
            return Err(UsageError::LimitReached {
                used,
                requested: estimate,
                limit: quota.limit(),
            });
        }

        let rewritten = rewrite_content(&content, &options);
        let words = u32::try_from(count_words(&rewritten)).unwrap_or(u32::MAX);
        let usage = quota.charge(&key, words)?;
        Ok((rewritten, words, usage))
    })
    .await?
    .map_err(|e| quota_error(&client, e, "Failed to record usage"))?;

    info!(client, %platform, estimate, words_used, "rewrote content");

    Ok(Json(RewriteResponse {
        content: rewritten,
        platform,
        words_used,
        usage,
        keywords,
    }))
}

/// POST /keyword-analytics
pub async fn keyword_analytics(
    payload: Result<Json<AnalyticsRequest>, JsonRejection>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let content = payload
        .ok()
        .and_then(|Json(request)| request.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ApiError::MissingParam("Missing content"))?;

    Ok(Json(AnalyticsResponse {
        keywords: seeded_keywords(&content),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_defaults_to_anonymous() {
        assert_eq!(client_key(None), "anonymous");
        assert_eq!(client_key(Some("  ".to_string())), "anonymous");
        assert_eq!(client_key(Some(" team-a ".to_string())), "team-a");
    }

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" \t".to_string())), None);
        assert_eq!(non_blank(Some(" casual ".to_string())), Some("casual".to_string()));
    }
}
