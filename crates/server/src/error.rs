use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use watchlog_core::error::{ApiError, ErrorEnvelope};
use watchlog_metadata::MetadataError;
use watchlog_tracker::ListError;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
#[derive(Debug)]
pub struct AppError(pub ApiError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self.0 {
            error!(%detail, "request failed");
        }
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<ListError> for AppError {
    fn from(e: ListError) -> Self {
        Self(e.into())
    }
}

/// Only direct detail lookups surface provider failures; list-shaped
/// discovery degrades to empty results before it gets here.
impl From<MetadataError> for AppError {
    fn from(e: MetadataError) -> Self {
        Self(match e {
            MetadataError::NotFound => ApiError::NotFound("media not found".into()),
            other => ApiError::BadGateway(other.to_string()),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self(ApiError::Internal(format!("db error: {e}")))
    }
}
