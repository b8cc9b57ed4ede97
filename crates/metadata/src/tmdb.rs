//! TMDB (The Movie Database) catalog for movies and tv.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use watchlog_core::types::MediaType;

use crate::normalize::{ProviderMediaPayload, TmdbMedia, TmdbPage};
use crate::provider::CatalogProvider;
use crate::retry::{RetryPolicy, classify_status, classify_transport};
use crate::{MediaDetail, MediaSummary, MetadataError};

pub const BASE_URL: &str = "https://api.themoviedb.org/3";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct TmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self, MetadataError> {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MetadataError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MetadataError> {
        let mut all_params = vec![("api_key", self.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{}{path}", self.base_url);
        let client = &self.client;
        let url = &url;
        let params = &all_params;

        self.retry
            .run(path, MetadataError::is_transient, || async move {
                debug!(path, "TMDB request");
                let resp = client
                    .get(url)
                    .query(params)
                    .send()
                    .await
                    .map_err(|e| classify_transport(&e))?;

                if !resp.status().is_success() {
                    return Err(classify_status(resp.status()));
                }

                resp.json::<T>().await.map_err(|e| classify_transport(&e))
            })
            .await
    }

    async fn list(
        &self,
        path: &str,
        media_type: MediaType,
        params: &[(&str, &str)],
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        let page: TmdbPage<TmdbMedia> = self.get_json(path, params).await?;
        Ok(page
            .results
            .into_iter()
            .map(|media| ProviderMediaPayload::MovieTv { media_type, media }.into_summary())
            .collect())
    }
}

fn unsupported() -> MetadataError {
    MetadataError::Permanent("TMDB does not serve anime".to_string())
}

fn segment(media_type: MediaType) -> Result<&'static str, MetadataError> {
    match media_type {
        MediaType::Movie => Ok("movie"),
        MediaType::Tv => Ok("tv"),
        MediaType::Anime => Err(unsupported()),
    }
}

/// Keep movie and tv hits from a `/search/multi` page, dropping people.
pub(crate) fn multi_hits(page: TmdbPage<TmdbMedia>) -> Vec<MediaSummary> {
    page.results
        .into_iter()
        .filter_map(|media| {
            let media_type = match media.media_type.as_deref() {
                Some("movie") => MediaType::Movie,
                Some("tv") => MediaType::Tv,
                _ => return None,
            };
            Some(ProviderMediaPayload::MovieTv { media_type, media }.into_summary())
        })
        .collect()
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<MediaSummary>, MetadataError> {
        let page: TmdbPage<TmdbMedia> = self
            .get_json(
                "/search/multi",
                &[("query", query), ("include_adult", "false")],
            )
            .await?;
        Ok(multi_hits(page))
    }

    async fn trending(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError> {
        let path = format!("/trending/{}/week", segment(media_type)?);
        self.list(&path, media_type, &[]).await
    }

    async fn latest(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError> {
        let path = match media_type {
            MediaType::Movie => "/movie/now_playing",
            MediaType::Tv => "/tv/on_the_air",
            MediaType::Anime => return Err(unsupported()),
        };
        self.list(path, media_type, &[("region", "US")]).await
    }

    async fn details(
        &self,
        media_type: MediaType,
        api_id: i64,
    ) -> Result<MediaDetail, MetadataError> {
        let path = format!("/{}/{api_id}", segment(media_type)?);
        let media: TmdbMedia = self.get_json(&path, &[]).await?;
        Ok(ProviderMediaPayload::MovieTv { media_type, media }.into_detail())
    }

    async fn similar(
        &self,
        media_type: MediaType,
        api_id: i64,
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        let path = format!("/{}/{api_id}/similar", segment(media_type)?);
        self.list(&path, media_type, &[]).await
    }
}
