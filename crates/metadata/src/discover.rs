//! Catalog discovery: search, trending, latest and detail lookups.
//!
//! List-shaped results never fail: a provider branch that errors is logged
//! and contributes nothing. Results with a failed branch are not cached, so
//! the next request tries the provider again.

use std::sync::Arc;

use tracing::warn;
use watchlog_core::types::MediaType;

use crate::cache::{CacheKey, DiscoveryCache};
use crate::provider::Catalogs;
use crate::{MediaDetail, MediaSummary, MetadataError, SearchResults};

#[derive(Clone)]
pub struct DiscoveryService {
    catalogs: Catalogs,
    cache: Arc<DiscoveryCache>,
}

#[derive(Clone, Copy)]
enum ListKind {
    Trending,
    Latest,
}

impl DiscoveryService {
    pub fn new(catalogs: Catalogs, cache: Arc<DiscoveryCache>) -> Self {
        Self { catalogs, cache }
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Search every catalog, or only the one serving `filter`.
    pub async fn search(&self, query: &str, filter: Option<MediaType>) -> SearchResults {
        let key = CacheKey::Search {
            media_type: filter,
            query: query.to_string(),
        };
        if let Some(hit) = self.cache.get::<SearchResults>(&key) {
            return hit;
        }

        let wants = |t: MediaType| filter.is_none_or(|f| f == t);
        let want_movie_tv = wants(MediaType::Movie) || wants(MediaType::Tv);
        let want_anime = wants(MediaType::Anime);

        let movie_tv = async {
            if !want_movie_tv {
                return Ok(Vec::new());
            }
            self.catalogs.for_type(MediaType::Movie)?.search(query).await
        };
        let anime = async {
            if !want_anime {
                return Ok(Vec::new());
            }
            self.catalogs.anime.search(query).await
        };
        let (movie_tv, anime) = futures::join!(movie_tv, anime);

        let mut results = SearchResults::default();
        let mut degraded = false;
        for (branch, outcome) in [("movie/tv", movie_tv), ("anime", anime)] {
            match outcome {
                Ok(hits) => {
                    results.extend(hits.into_iter().filter(|h| wants(h.media_type)).collect());
                }
                Err(e) => {
                    warn!(branch, query, error = %e, "search branch failed, continuing");
                    degraded = true;
                }
            }
        }

        if !degraded {
            self.cache.insert(key, &results);
        }
        results
    }

    pub async fn trending(&self, media_type: MediaType) -> Vec<MediaSummary> {
        self.list(ListKind::Trending, media_type).await
    }

    pub async fn latest(&self, media_type: MediaType) -> Vec<MediaSummary> {
        self.list(ListKind::Latest, media_type).await
    }

    async fn list(&self, kind: ListKind, media_type: MediaType) -> Vec<MediaSummary> {
        let key = match kind {
            ListKind::Trending => CacheKey::Trending(media_type),
            ListKind::Latest => CacheKey::Latest(media_type),
        };
        if let Some(hit) = self.cache.get::<Vec<MediaSummary>>(&key) {
            return hit;
        }

        let outcome = match self.catalogs.for_type(media_type) {
            Ok(provider) => match kind {
                ListKind::Trending => provider.trending(media_type).await,
                ListKind::Latest => provider.latest(media_type).await,
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(items) => {
                self.cache.insert(key, &items);
                items
            }
            Err(e) => {
                warn!(?key, error = %e, "discovery list failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Single-title lookup. Errors are returned to the caller.
    pub async fn details(
        &self,
        media_type: MediaType,
        api_id: i64,
    ) -> Result<MediaDetail, MetadataError> {
        self.catalogs
            .for_type(media_type)?
            .details(media_type, api_id)
            .await
    }
}
