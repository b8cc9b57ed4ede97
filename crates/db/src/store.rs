//! SQLite-backed [`DocumentStore`].
//!
//! A user document is the `user` row plus its `tracked_item` rows. Saving
//! replaces the item rows inside one transaction, so readers see either the
//! old collection or the new one.

use sqlx::SqlitePool;
use tracing::warn;
use watchlog_core::store::{DocumentStore, StoreError};
use watchlog_core::types::{NaturalKey, TrackedItem, UserDocument};

use crate::repo::{tracked_items, users};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn decode(row: tracked_items::TrackedItemRow) -> Result<TrackedItem, StoreError> {
    let id = row.id.clone();
    TrackedItem::try_from(row).map_err(|e| {
        warn!(item_id = %id, error = %e, "undecodable tracked item row");
        StoreError::Corrupt(e)
    })
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError> {
        let Some(user) = users::find_by_id(&self.pool, user_id)
            .await
            .map_err(unavailable)?
        else {
            return Ok(None);
        };

        let rows = tracked_items::list_for_user(&self.pool, user_id)
            .await
            .map_err(unavailable)?;
        let tracked_items = rows
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(UserDocument {
            id: user.id,
            username: user.username,
            email: user.email,
            tracked_items,
        }))
    }

    async fn find_user_by_natural_key(
        &self,
        user_id: &str,
        key: NaturalKey,
    ) -> Result<Option<TrackedItem>, StoreError> {
        tracked_items::find_by_key(&self.pool, user_id, key)
            .await
            .map_err(unavailable)?
            .map(decode)
            .transpose()
    }

    async fn save_user(&self, user: &UserDocument) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        sqlx::query("UPDATE user SET username = ?, email = ? WHERE id = ?")
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.id)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;

        tracked_items::replace_all(&mut tx, &user.id, &user.tracked_items)
            .await
            .map_err(unavailable)?;

        tx.commit().await.map_err(unavailable)
    }

    async fn fill_item_metadata(
        &self,
        user_id: &str,
        item: &TrackedItem,
    ) -> Result<bool, StoreError> {
        tracked_items::fill_display_fields(&self.pool, user_id, item)
            .await
            .map_err(unavailable)
    }

    async fn delete_tracked_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<bool, StoreError> {
        tracked_items::delete(&self.pool, user_id, item_id)
            .await
            .map_err(unavailable)
    }
}
