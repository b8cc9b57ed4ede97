//! AniList GraphQL catalog for anime.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use watchlog_core::clock::Clock;
use watchlog_core::types::MediaType;

use crate::normalize::{
    AniMedia, AniMediaData, AniPageData, GraphQlError, GraphQlResponse, ProviderMediaPayload,
};
use crate::provider::CatalogProvider;
use crate::retry::{RetryPolicy, classify_status, classify_transport};
use crate::tmdb::REQUEST_TIMEOUT;
use crate::{MediaDetail, MediaSummary, MetadataError};

pub const ENDPOINT: &str = "https://graphql.anilist.co";
const PER_PAGE: u32 = 20;
const SEARCH_PER_PAGE: u32 = 10;

const MEDIA_FIELDS: &str = "id title { english romaji native } description coverImage { large } \
     genres episodes duration status startDate { year month day } popularity";

/// AniList season for a calendar month.
pub fn season_for(at: DateTime<Utc>) -> (&'static str, i32) {
    let season = match at.month() {
        1..=3 => "WINTER",
        4..=6 => "SPRING",
        7..=9 => "SUMMER",
        _ => "FALL",
    };
    (season, at.year())
}

#[derive(Debug, Deserialize)]
struct RecommendationData {
    #[serde(rename = "Media")]
    media: Option<RecommendationMedia>,
}

#[derive(Debug, Deserialize)]
struct RecommendationMedia {
    recommendations: Option<RecommendationConnection>,
}

#[derive(Debug, Deserialize)]
struct RecommendationConnection {
    #[serde(default)]
    nodes: Vec<RecommendationNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationNode {
    media_recommendation: Option<AniMedia>,
}

pub struct AniListClient {
    endpoint: String,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl AniListClient {
    pub fn new(clock: Arc<dyn Clock>) -> Result<Self, MetadataError> {
        Self::with_endpoint(ENDPOINT.to_string(), clock)
    }

    pub fn with_endpoint(endpoint: String, clock: Arc<dyn Clock>) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MetadataError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            endpoint,
            client,
            clock,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn query<T: DeserializeOwned>(
        &self,
        label: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, MetadataError> {
        let body = json!({ "query": query, "variables": variables });
        let client = &self.client;
        let endpoint = self.endpoint.as_str();
        let body = &body;

        self.retry
            .run(label, MetadataError::is_transient, || async move {
                debug!(query = label, "AniList request");
                let resp = client
                    .post(endpoint)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| classify_transport(&e))?;

                let status = resp.status();
                let parsed: GraphQlResponse<T> = match resp.json().await {
                    Ok(parsed) => parsed,
                    Err(_) if !status.is_success() => return Err(classify_status(status)),
                    Err(e) => return Err(classify_transport(&e)),
                };

                if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
                    return Err(graphql_error(status, &errors));
                }
                if !status.is_success() {
                    return Err(classify_status(status));
                }
                parsed
                    .data
                    .ok_or_else(|| MetadataError::Permanent("AniList response had no data".into()))
            })
            .await
    }

    async fn page(
        &self,
        label: &str,
        query: &str,
        variables: Value,
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        let data: AniPageData = self.query(label, query, variables).await?;
        Ok(data
            .page
            .map(|p| p.media)
            .unwrap_or_default()
            .into_iter()
            .map(|m| ProviderMediaPayload::Anime(m).into_summary())
            .collect())
    }
}

fn graphql_error(status: reqwest::StatusCode, errors: &[GraphQlError]) -> MetadataError {
    let worst = errors.iter().filter_map(|e| e.status).max();
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    match worst.and_then(|s| reqwest::StatusCode::from_u16(s).ok()) {
        Some(code) if code == reqwest::StatusCode::NOT_FOUND => MetadataError::NotFound,
        Some(code) if code.is_server_error() => MetadataError::Transient(message),
        _ if status.is_server_error() => MetadataError::Transient(message),
        _ => MetadataError::Permanent(format!("AniList GraphQL error: {message}")),
    }
}

fn only_anime(media_type: MediaType) -> Result<(), MetadataError> {
    if media_type == MediaType::Anime {
        Ok(())
    } else {
        Err(MetadataError::Permanent(format!(
            "AniList does not serve {media_type}"
        )))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for AniListClient {
    fn name(&self) -> &'static str {
        "anilist"
    }

    async fn search(&self, query: &str) -> Result<Vec<MediaSummary>, MetadataError> {
        let gql = format!(
            "query ($search: String, $perPage: Int) {{ Page(page: 1, perPage: $perPage) {{ \
             media(search: $search, type: ANIME, sort: POPULARITY_DESC) {{ {MEDIA_FIELDS} }} }} }}"
        );
        self.page("search", &gql, json!({ "search": query, "perPage": SEARCH_PER_PAGE }))
            .await
    }

    async fn trending(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError> {
        only_anime(media_type)?;
        let gql = format!(
            "query ($perPage: Int) {{ Page(page: 1, perPage: $perPage) {{ \
             media(sort: TRENDING_DESC, type: ANIME) {{ {MEDIA_FIELDS} }} }} }}"
        );
        self.page("trending", &gql, json!({ "perPage": PER_PAGE }))
            .await
    }

    async fn latest(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError> {
        only_anime(media_type)?;
        let (season, year) = season_for(self.clock.now());
        let gql = format!(
            "query ($season: MediaSeason, $year: Int, $perPage: Int) {{ Page(page: 1, perPage: $perPage) {{ \
             media(season: $season, seasonYear: $year, type: ANIME, sort: POPULARITY_DESC) {{ {MEDIA_FIELDS} }} }} }}"
        );
        self.page(
            "latest",
            &gql,
            json!({ "season": season, "year": year, "perPage": PER_PAGE }),
        )
        .await
    }

    async fn details(
        &self,
        media_type: MediaType,
        api_id: i64,
    ) -> Result<MediaDetail, MetadataError> {
        only_anime(media_type)?;
        let gql = format!("query ($id: Int) {{ Media(id: $id, type: ANIME) {{ {MEDIA_FIELDS} }} }}");
        let data: AniMediaData = self.query("details", &gql, json!({ "id": api_id })).await?;
        let media = data.media.ok_or(MetadataError::NotFound)?;
        Ok(ProviderMediaPayload::Anime(media).into_detail())
    }

    async fn similar(
        &self,
        media_type: MediaType,
        api_id: i64,
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        only_anime(media_type)?;
        let gql = format!(
            "query ($id: Int) {{ Media(id: $id, type: ANIME) {{ \
             recommendations(sort: RATING_DESC) {{ nodes {{ mediaRecommendation {{ {MEDIA_FIELDS} }} }} }} }} }}"
        );
        let data: RecommendationData = self.query("similar", &gql, json!({ "id": api_id })).await?;
        Ok(data
            .media
            .and_then(|m| m.recommendations)
            .map(|r| r.nodes)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|n| n.media_recommendation)
            .map(|m| ProviderMediaPayload::Anime(m).into_summary())
            .collect())
    }
}
