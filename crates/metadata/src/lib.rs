pub mod anilist;
pub mod cache;
pub mod discover;
pub mod enrich;
pub mod normalize;
pub mod provider;
pub mod recommend;
pub mod retry;
pub mod tmdb;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use watchlog_core::types::{MediaType, NaturalKey};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// Timeouts, connection failures and upstream 5xx. Worth retrying.
    #[error("transient provider failure: {0}")]
    Transient(String),
    /// Upstream 4xx or a payload we could not decode.
    #[error("provider error: {0}")]
    Permanent(String),
    #[error("not found")]
    NotFound,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl MetadataError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A catalog title normalized to one shape regardless of provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSummary {
    pub api_id: i64,
    pub media_type: MediaType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
}

impl MediaSummary {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.api_id, self.media_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetail {
    #[serde(flatten)]
    pub summary: MediaSummary,
    /// Minutes per movie or per episode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_seasons: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Search hits grouped by media type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub movies: Vec<MediaSummary>,
    pub tv: Vec<MediaSummary>,
    pub anime: Vec<MediaSummary>,
}

impl SearchResults {
    pub fn bucket_mut(&mut self, media_type: MediaType) -> &mut Vec<MediaSummary> {
        match media_type {
            MediaType::Movie => &mut self.movies,
            MediaType::Tv => &mut self.tv,
            MediaType::Anime => &mut self.anime,
        }
    }

    /// Route each hit into the bucket of its own media type.
    pub fn extend(&mut self, hits: Vec<MediaSummary>) {
        for hit in hits {
            self.bucket_mut(hit.media_type).push(hit);
        }
    }
}
