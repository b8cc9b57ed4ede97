use std::collections::HashMap;

use tokio::sync::RwLock;
use watchlog_core::store::{DocumentStore, StoreError};
use watchlog_core::types::{NaturalKey, TrackedItem, UserDocument};

/// In-process document store. Whole-document replace under a lock, which is
/// the same consistency the engine expects from a real store.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, id: &str, username: &str, email: &str) {
        self.users.write().await.insert(
            id.to_string(),
            UserDocument {
                id: id.to_string(),
                username: username.to_string(),
                email: email.to_string(),
                tracked_items: Vec::new(),
            },
        );
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_user_by_natural_key(
        &self,
        user_id: &str,
        key: NaturalKey,
    ) -> Result<Option<TrackedItem>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .and_then(|u| u.find_by_key(key).cloned()))
    }

    async fn save_user(&self, user: &UserDocument) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn fill_item_metadata(
        &self,
        user_id: &str,
        item: &TrackedItem,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(user_id)
            .and_then(|u| u.find_item_mut(&item.id))
            .is_some_and(|target| target.fill_display_fields(item)))
    }

    async fn delete_tracked_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let before = user.tracked_items.len();
        user.tracked_items.retain(|i| i.id != item_id);
        Ok(user.tracked_items.len() < before)
    }
}
