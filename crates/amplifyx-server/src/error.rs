use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Handler failure. The message is what the caller sees; any source error is
/// only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingParam(&'static str),

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Daily limit reached")]
    LimitReached,

    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn upstream(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ApiError::Upstream {
            message,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParam(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::LimitReached => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Upstream { message, source } = &self {
            warn!(error = format!("{:#}", source), "{}", message);
        }

        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
