use std::sync::Arc;

use watchlog_core::types::MediaType;

use crate::{MediaDetail, MediaSummary, MetadataError};

/// One upstream catalog. Results come back already normalized.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Free-text search. Hits may span several media types; each carries its
    /// own `media_type`.
    async fn search(&self, query: &str) -> Result<Vec<MediaSummary>, MetadataError>;

    async fn trending(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError>;

    /// Now playing, on the air, or airing this season.
    async fn latest(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError>;

    async fn details(&self, media_type: MediaType, api_id: i64)
    -> Result<MediaDetail, MetadataError>;

    /// Titles the provider considers similar to `api_id`.
    async fn similar(
        &self,
        media_type: MediaType,
        api_id: i64,
    ) -> Result<Vec<MediaSummary>, MetadataError>;
}

/// Routes each media type to the catalog that serves it.
#[derive(Clone)]
pub struct Catalogs {
    /// Movies and tv. `None` when no API key is configured.
    pub movie_tv: Option<Arc<dyn CatalogProvider>>,
    pub anime: Arc<dyn CatalogProvider>,
}

impl Catalogs {
    pub fn new(movie_tv: Option<Arc<dyn CatalogProvider>>, anime: Arc<dyn CatalogProvider>) -> Self {
        Self { movie_tv, anime }
    }

    pub fn for_type(&self, media_type: MediaType) -> Result<&Arc<dyn CatalogProvider>, MetadataError> {
        match media_type {
            MediaType::Anime => Ok(&self.anime),
            MediaType::Movie | MediaType::Tv => self
                .movie_tv
                .as_ref()
                .ok_or_else(|| MetadataError::Unavailable("movie/tv catalog not configured".into())),
        }
    }
}
