//! "More like what you loved": similar titles seeded by highly rated
//! completed items.

use std::collections::HashSet;

use tracing::warn;
use watchlog_core::types::{NaturalKey, TrackedItem, WatchStatus};

use crate::SearchResults;
use crate::provider::Catalogs;

pub const MIN_SEED_RATING: u8 = 8;
pub const MAX_SEEDS: usize = 3;
pub const PER_TYPE_LIMIT: usize = 10;

/// The items recommendations are seeded from, in list order.
pub fn seeds(items: &[TrackedItem]) -> Vec<&TrackedItem> {
    items
        .iter()
        .filter(|i| i.status == WatchStatus::Completed && i.rating.is_some_and(|r| r >= MIN_SEED_RATING))
        .take(MAX_SEEDS)
        .collect()
}

/// Similar titles grouped by media type. Titles already tracked are left
/// out and a failing provider contributes nothing.
pub async fn recommend(catalogs: &Catalogs, items: &[TrackedItem]) -> SearchResults {
    let lookups = seeds(items).into_iter().map(|seed| async move {
        let outcome = match catalogs.for_type(seed.media_type) {
            Ok(provider) => provider.similar(seed.media_type, seed.api_id).await,
            Err(e) => Err(e),
        };
        outcome.unwrap_or_else(|e| {
            warn!(
                api_id = seed.api_id,
                media_type = %seed.media_type,
                error = %e,
                "similar-title lookup failed"
            );
            Vec::new()
        })
    });
    let batches = futures::future::join_all(lookups).await;

    let tracked: HashSet<NaturalKey> = items.iter().map(TrackedItem::natural_key).collect();
    let mut seen: HashSet<NaturalKey> = HashSet::new();
    let mut out = SearchResults::default();

    for hit in batches.into_iter().flatten() {
        let key = hit.natural_key();
        if tracked.contains(&key) || !seen.insert(key) {
            continue;
        }
        let bucket = out.bucket_mut(hit.media_type);
        if bucket.len() < PER_TYPE_LIMIT {
            bucket.push(hit);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CatalogProvider;
    use crate::provider::stub::StubProvider;
    use crate::{MediaSummary, MetadataError};
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use watchlog_core::types::MediaType;

    fn item(api_id: i64, media_type: MediaType, rating: Option<u8>, status: WatchStatus) -> TrackedItem {
        TrackedItem {
            id: format!("item-{api_id}"),
            api_id,
            media_type,
            title: None,
            poster: None,
            overview: None,
            release_date: None,
            first_air_date: None,
            genres: Vec::new(),
            release_year: None,
            status,
            rating,
            self_note: None,
            watched_seasons: Vec::new(),
            date_added: DateTime::<Utc>::UNIX_EPOCH,
            date_completed: None,
        }
    }

    fn hit(api_id: i64, media_type: MediaType) -> MediaSummary {
        MediaSummary {
            api_id,
            media_type,
            title: format!("similar {api_id}"),
            overview: None,
            poster: None,
            release_date: None,
            first_air_date: None,
            genres: Vec::new(),
            popularity: None,
        }
    }

    fn catalogs(stub: &Arc<StubProvider>) -> Catalogs {
        let movie_tv: Arc<dyn CatalogProvider> = stub.clone();
        Catalogs::new(Some(movie_tv), stub.clone())
    }

    #[test]
    fn seeds_are_the_first_three_loved_completions() {
        use WatchStatus::*;
        let items = vec![
            item(1, MediaType::Movie, Some(9), Completed),
            item(2, MediaType::Movie, Some(7), Completed),
            item(3, MediaType::Movie, Some(10), Watching),
            item(4, MediaType::Tv, Some(8), Completed),
            item(5, MediaType::Anime, Some(8), Completed),
            item(6, MediaType::Anime, Some(10), Completed),
        ];
        let ids: Vec<i64> = seeds(&items).iter().map(|i| i.api_id).collect();
        assert_eq!(ids, vec![1, 4, 5]);
    }

    #[tokio::test]
    async fn drops_tracked_and_duplicate_titles() {
        let stub = Arc::new(StubProvider::new());
        stub.similar.lock().insert(
            1,
            Ok(vec![hit(10, MediaType::Movie), hit(2, MediaType::Movie), hit(11, MediaType::Movie)]),
        );
        stub.similar
            .lock()
            .insert(3, Ok(vec![hit(10, MediaType::Movie), hit(12, MediaType::Movie)]));

        let items = vec![
            item(1, MediaType::Movie, Some(9), WatchStatus::Completed),
            item(2, MediaType::Movie, None, WatchStatus::PlanToWatch),
            item(3, MediaType::Movie, Some(8), WatchStatus::Completed),
        ];
        let out = recommend(&catalogs(&stub), &items).await;
        let ids: Vec<i64> = out.movies.iter().map(|m| m.api_id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn same_id_under_another_type_is_not_a_duplicate() {
        let stub = Arc::new(StubProvider::new());
        stub.similar.lock().insert(1, Ok(vec![hit(50, MediaType::Anime)]));
        stub.similar.lock().insert(2, Ok(vec![hit(50, MediaType::Tv)]));

        let items = vec![
            item(1, MediaType::Anime, Some(9), WatchStatus::Completed),
            item(2, MediaType::Tv, Some(9), WatchStatus::Completed),
        ];
        let out = recommend(&catalogs(&stub), &items).await;
        assert_eq!(out.anime.len(), 1);
        assert_eq!(out.tv.len(), 1);
    }

    #[tokio::test]
    async fn limits_each_type_to_ten() {
        let stub = Arc::new(StubProvider::new());
        stub.similar
            .lock()
            .insert(1, Ok((100..125).map(|id| hit(id, MediaType::Movie)).collect()));

        let items = vec![item(1, MediaType::Movie, Some(10), WatchStatus::Completed)];
        let out = recommend(&catalogs(&stub), &items).await;
        assert_eq!(out.movies.len(), PER_TYPE_LIMIT);
    }

    #[tokio::test]
    async fn provider_failure_contributes_nothing() {
        let stub = Arc::new(StubProvider::new());
        stub.similar
            .lock()
            .insert(1, Err(MetadataError::Transient("timeout".into())));
        stub.similar.lock().insert(2, Ok(vec![hit(20, MediaType::Tv)]));

        let items = vec![
            item(1, MediaType::Movie, Some(9), WatchStatus::Completed),
            item(2, MediaType::Tv, Some(9), WatchStatus::Completed),
        ];
        let out = recommend(&catalogs(&stub), &items).await;
        assert!(out.movies.is_empty());
        assert_eq!(out.tv.len(), 1);
    }
}
