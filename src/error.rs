use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::lookup::LookupError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("count {count} exceeds the configured batch limit of {max}")]
    BatchLimit { count: i64, max: i64 },

    #[error("External lookup error: {0}")]
    Lookup(#[from] LookupError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // Invalid input gets a bare 400 with no body
            AppError::BadRequest(reason) => {
                tracing::debug!(reason = %reason, "Rejected request");
                StatusCode::BAD_REQUEST.into_response()
            }
            AppError::Lookup(LookupError::RangeOverflow { start, count }) => {
                tracing::debug!(start, count, "Rejected request: id range overflows");
                StatusCode::BAD_REQUEST.into_response()
            }
            // Well-formed but over the operator's limit; say which limit
            AppError::BatchLimit { count, max } => {
                tracing::info!(count, max, "Rejected request: batch limit exceeded");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            AppError::Lookup(LookupError::Failed { id }) => {
                tracing::warn!(id, "External service unavailable");
                (
                    StatusCode::BAD_GATEWAY,
                    LookupError::Failed { id: *id }.to_string(),
                )
                    .into_response()
            }
        }
    }
}
