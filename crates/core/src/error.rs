use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed")]
    Validation(Value),

    #[error("item already tracked")]
    DuplicateItem(Value),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("upstream error: {0}")]
    BadGateway(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Field-level validation failure, e.g. `{"rating": ["must be between 1 and 10"]}`.
    pub fn validation(fields: Value) -> Self {
        Self::Validation(fields)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_error",
            Self::DuplicateItem(_) => "duplicate_item",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::BadGateway(_) => "provider_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::DuplicateItem(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::BadGateway(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::Validation(fields) => fields.clone(),
            Self::DuplicateItem(item) => serde_json::json!({ "item": item }),
            _ => Value::Object(serde_json::Map::new()),
        }
    }

    /// Message safe to show a client. Internal failures never leak detail.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// JSON error envelope: `{ "error": { "code": "…", "message": "…", "details": {} } }`
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        Self {
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.public_message(),
                details: e.details(),
            },
        }
    }
}
