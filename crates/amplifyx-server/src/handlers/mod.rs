//! Request handlers, grouped by what they fetch.

pub mod files;
pub mod page;
pub mod pagespeed;
pub mod report;
pub mod search;
pub mod usage;

use axum::Json;
use serde_json::{Value, json};
use url::form_urlencoded;

use crate::error::ApiError;

pub const ROOT_MESSAGE: &str = "SEO API Backend is running!";

/// GET /
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The single non-empty value of `name` in a raw query string.
///
/// Absent, empty and repeated parameters all yield `None`.
pub(crate) fn single_param(query: Option<&str>, name: &str) -> Option<String> {
    let mut values = form_urlencoded::parse(query?.as_bytes())
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned());

    let value = values.next()?;
    if values.next().is_some() || value.is_empty() {
        return None;
    }
    Some(value)
}

/// [`single_param`] for the `url` parameter every page route takes
pub(crate) fn required_url(query: Option<&str>) -> Result<String, ApiError> {
    single_param(query, "url").ok_or(ApiError::MissingParam("Missing url"))
}
