pub mod memory;
pub mod query;
pub mod reconcile;
pub mod stats;
pub mod transitions;
pub mod validate;

use serde_json::Value;
use thiserror::Error;
use watchlog_core::error::ApiError;
use watchlog_core::store::StoreError;
use watchlog_core::types::TrackedItem;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("validation failed: {0}")]
    Validation(Value),
    #[error("item already tracked")]
    DuplicateItem(Box<TrackedItem>),
    #[error("tracked item not found")]
    ItemNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("season tracking is not available for movies")]
    InvalidMediaType,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ListError> for ApiError {
    fn from(e: ListError) -> Self {
        match e {
            ListError::Validation(fields) => ApiError::validation(fields),
            ListError::DuplicateItem(item) => ApiError::DuplicateItem(
                serde_json::to_value(*item).unwrap_or(Value::Null),
            ),
            ListError::ItemNotFound => ApiError::NotFound("tracked item not found".into()),
            ListError::UserNotFound => ApiError::NotFound("user not found".into()),
            ListError::InvalidMediaType => ApiError::BadRequest(
                "season tracking is only available for tv and anime".into(),
            ),
            ListError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}
