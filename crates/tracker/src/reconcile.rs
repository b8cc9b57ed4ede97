//! List reconciliation: add, update, season toggle and removal of tracked
//! items inside a user's document.

use std::sync::Arc;

use tracing::debug;
use watchlog_core::clock::Clock;
use watchlog_core::store::DocumentStore;
use watchlog_core::types::{
    AddItemRequest, ItemPatch, TrackedItem, UserDocument, WatchStatus, year_of,
};

use crate::ListError;
use crate::transitions::{self, DateAction, Progress, SEASON_TRANSITIONS, SeasonEvent};
use crate::validate::{self, ValidPatch};

#[derive(Clone)]
pub struct ListEngine {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ListEngine {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn load_user(&self, user_id: &str) -> Result<UserDocument, ListError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ListError::UserNotFound)
    }

    pub async fn items(&self, user_id: &str) -> Result<Vec<TrackedItem>, ListError> {
        Ok(self.load_user(user_id).await?.tracked_items)
    }

    /// Start tracking a title. Rejects a natural key the user already tracks,
    /// handing back the existing item.
    pub async fn add(
        &self,
        user_id: &str,
        req: &AddItemRequest,
    ) -> Result<TrackedItem, ListError> {
        let new = validate::validate_add(req)?;

        if let Some(existing) = self
            .store
            .find_user_by_natural_key(user_id, new.key)
            .await?
        {
            return Err(ListError::DuplicateItem(Box::new(existing)));
        }

        let mut user = self.load_user(user_id).await?;
        if let Some(existing) = user.find_by_key(new.key) {
            return Err(ListError::DuplicateItem(Box::new(existing.clone())));
        }

        let now = self.clock.now();
        let status = new.status.unwrap_or_default();
        let meta = new.metadata;
        let release_year = meta.release_year.or_else(|| {
            meta.release_date
                .as_deref()
                .or(meta.first_air_date.as_deref())
                .and_then(year_of)
        });

        let item = TrackedItem {
            id: uuid::Uuid::new_v4().to_string(),
            api_id: new.key.api_id,
            media_type: new.key.media_type,
            title: meta.title,
            poster: meta.poster,
            overview: meta.overview,
            release_date: meta.release_date,
            first_air_date: meta.first_air_date,
            genres: meta.genres.unwrap_or_default(),
            release_year,
            status,
            rating: None,
            self_note: None,
            watched_seasons: Vec::new(),
            date_added: now,
            date_completed: (status == WatchStatus::Completed).then_some(now),
        };

        user.tracked_items.push(item.clone());
        self.store.save_user(&user).await?;
        debug!(user_id, item_id = %item.id, api_id = item.api_id, media_type = %item.media_type, "tracked item added");
        Ok(item)
    }

    /// Apply a partial patch of the allow-listed fields.
    pub async fn update(
        &self,
        user_id: &str,
        item_id: &str,
        patch: &ItemPatch,
    ) -> Result<TrackedItem, ListError> {
        let patch = validate::validate_patch(patch)?;
        let now = self.clock.now();

        let mut user = self.load_user(user_id).await?;
        let item = user.find_item_mut(item_id).ok_or(ListError::ItemNotFound)?;
        apply_patch(item, patch, now)?;
        let updated = item.clone();

        self.store.save_user(&user).await?;
        debug!(user_id, item_id, status = %updated.status, "tracked item updated");
        Ok(updated)
    }

    /// Flip membership of one season and run the season transition table.
    pub async fn toggle_season(
        &self,
        user_id: &str,
        item_id: &str,
        season: i64,
        total_seasons: Option<i64>,
    ) -> Result<TrackedItem, ListError> {
        let (season, total) = validate::validate_season(season, total_seasons)?;
        let now = self.clock.now();

        let mut user = self.load_user(user_id).await?;
        let item = user.find_item_mut(item_id).ok_or(ListError::ItemNotFound)?;
        if !item.media_type.is_episodic() {
            return Err(ListError::InvalidMediaType);
        }

        let event = match item.watched_seasons.binary_search(&season) {
            Ok(pos) => {
                item.watched_seasons.remove(pos);
                SeasonEvent::Removed
            }
            Err(pos) => {
                item.watched_seasons.insert(pos, season);
                SeasonEvent::Added
            }
        };

        let progress = Progress::of(item.watched_seasons.len(), total);
        let resolution = transitions::resolve(&SEASON_TRANSITIONS, item.status, event, progress);
        item.status = resolution.status;
        match resolution.date {
            DateAction::Keep => {}
            DateAction::Stamp => item.date_completed = Some(now),
            DateAction::Clear => item.date_completed = None,
        }
        let updated = item.clone();

        self.store.save_user(&user).await?;
        debug!(
            user_id,
            item_id,
            season,
            ?event,
            fired = ?resolution.fired,
            status = %updated.status,
            "season toggled"
        );
        Ok(updated)
    }

    /// Hard delete. Reports `ItemNotFound` when the id is not in the list.
    pub async fn remove(&self, user_id: &str, item_id: &str) -> Result<(), ListError> {
        self.load_user(user_id).await?;
        if self.store.delete_tracked_item(user_id, item_id).await? {
            debug!(user_id, item_id, "tracked item removed");
            Ok(())
        } else {
            Err(ListError::ItemNotFound)
        }
    }

    /// Write provider-filled display fields back to the stored items.
    ///
    /// Each item is filled in place by the store, column by column, and only
    /// where the stored value is still blank. User-owned fields are never
    /// written, so an edit that lands while enrichment runs is kept.
    pub async fn fill_metadata(
        &self,
        user_id: &str,
        enriched: &[TrackedItem],
    ) -> Result<usize, ListError> {
        let mut filled = 0;
        for source in enriched {
            if self.store.fill_item_metadata(user_id, source).await? {
                filled += 1;
            }
        }

        if filled > 0 {
            debug!(user_id, filled, "persisted enriched metadata");
        }
        Ok(filled)
    }
}

fn apply_patch(
    item: &mut TrackedItem,
    patch: ValidPatch,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), ListError> {
    if let Some(seasons) = &patch.watched_seasons {
        if !item.media_type.is_episodic() && !seasons.is_empty() {
            return Err(ListError::InvalidMediaType);
        }
    }

    let previous = item.status;
    if let Some(status) = patch.status {
        item.status = status;
    }
    if let Some(rating) = patch.rating {
        item.rating = rating;
    }
    if let Some(note) = patch.self_note {
        item.self_note = note;
    }
    if let Some(seasons) = patch.watched_seasons {
        item.watched_seasons = seasons;
    }
    match patch.date_completed {
        Some(date) => item.date_completed = date,
        None if previous == WatchStatus::Completed && item.status != WatchStatus::Completed => {
            item.date_completed = None;
        }
        None => {}
    }

    if item.status == WatchStatus::Completed && item.date_completed.is_none() {
        item.date_completed = Some(now);
    }
    Ok(())
}
