//! Document store collaborator.
//!
//! Tracked items live inside their owning user's document; the store only
//! promises that `save_user` replaces that document atomically and that
//! `fill_item_metadata` touches nothing but one item's blank display fields.

use thiserror::Error;

use crate::types::{NaturalKey, TrackedItem, UserDocument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError>;

    async fn find_user_by_natural_key(
        &self,
        user_id: &str,
        key: NaturalKey,
    ) -> Result<Option<TrackedItem>, StoreError>;

    /// Replace the whole user document, tracked items included.
    async fn save_user(&self, user: &UserDocument) -> Result<(), StoreError>;

    /// Fill the blank display fields of one stored item from `item`, matched
    /// by id. Returns whether the stored item changed; a missing user or item
    /// is not an error.
    async fn fill_item_metadata(
        &self,
        user_id: &str,
        item: &TrackedItem,
    ) -> Result<bool, StoreError>;

    /// Returns whether an item was actually removed.
    async fn delete_tracked_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<bool, StoreError>;
}
