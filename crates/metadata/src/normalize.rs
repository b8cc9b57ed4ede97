//! Upstream payload shapes and their mapping to [`MediaSummary`] / [`MediaDetail`].
//!
//! Each provider's wire format is deserialized into its own typed struct and
//! mapped through one function per variant of [`ProviderMediaPayload`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use watchlog_core::types::MediaType;

use crate::{MediaDetail, MediaSummary};

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Remove `<...>` markup from provider descriptions.
pub fn strip_html(text: &str) -> String {
    TAG.replace_all(text, "").trim().to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn clean_overview(raw: Option<String>) -> Option<String> {
    non_empty(raw.map(|s| strip_html(&s)))
}

// ---- TMDB -----------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// A movie or tv record from a list, search or detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMedia {
    pub id: i64,
    /// Present on `/search/multi` hits only.
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub status: Option<String>,
}

// ---- AniList --------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniPageData {
    #[serde(rename = "Page")]
    pub page: Option<AniPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniPage {
    #[serde(default)]
    pub media: Vec<AniMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniMediaData {
    #[serde(rename = "Media")]
    pub media: Option<AniMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AniTitle {
    pub english: Option<String>,
    pub romaji: Option<String>,
    pub native: Option<String>,
}

impl AniTitle {
    /// English, then romaji, then native.
    pub fn preferred(&self) -> Option<String> {
        [&self.english, &self.romaji, &self.native]
            .into_iter()
            .find_map(|t| non_empty(t.clone()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AniCoverImage {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AniFuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl AniFuzzyDate {
    /// `YYYY-MM-DD`, defaulting missing month and day to 01.
    pub fn to_date_string(&self) -> Option<String> {
        let year = self.year?;
        Some(format!(
            "{year:04}-{:02}-{:02}",
            self.month.unwrap_or(1),
            self.day.unwrap_or(1)
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniMedia {
    pub id: i64,
    pub title: Option<AniTitle>,
    pub description: Option<String>,
    pub cover_image: Option<AniCoverImage>,
    pub genres: Option<Vec<String>>,
    pub episodes: Option<u32>,
    pub duration: Option<u32>,
    pub status: Option<String>,
    pub start_date: Option<AniFuzzyDate>,
    pub popularity: Option<f64>,
}

// ---- normalization --------------------------------------------------------

/// One upstream record, tagged by the provider family that produced it.
#[derive(Debug, Clone)]
pub enum ProviderMediaPayload {
    MovieTv {
        media_type: MediaType,
        media: TmdbMedia,
    },
    Anime(AniMedia),
}

impl ProviderMediaPayload {
    pub fn into_summary(self) -> MediaSummary {
        match self {
            Self::MovieTv { media_type, media } => tmdb_summary(media_type, media),
            Self::Anime(media) => anime_summary(media),
        }
    }

    pub fn into_detail(self) -> MediaDetail {
        match self {
            Self::MovieTv { media_type, media } => tmdb_detail(media_type, media),
            Self::Anime(media) => anime_detail(media),
        }
    }
}

fn tmdb_summary(media_type: MediaType, m: TmdbMedia) -> MediaSummary {
    let title = non_empty(m.title)
        .or_else(|| non_empty(m.name))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let (release_date, first_air_date) = match media_type {
        MediaType::Tv => (None, non_empty(m.first_air_date)),
        _ => (non_empty(m.release_date), None),
    };
    MediaSummary {
        api_id: m.id,
        media_type,
        title,
        overview: clean_overview(m.overview),
        poster: non_empty(m.poster_path).map(|p| format!("{TMDB_IMAGE_BASE}{p}")),
        release_date,
        first_air_date,
        genres: m.genres.into_iter().map(|g| g.name).collect(),
        popularity: m.popularity,
    }
}

fn tmdb_detail(media_type: MediaType, mut m: TmdbMedia) -> MediaDetail {
    let runtime = m.runtime.or_else(|| m.episode_run_time.first().copied());
    let number_of_seasons = m.number_of_seasons;
    let episodes = m.number_of_episodes;
    let status = m.status.take();
    MediaDetail {
        summary: tmdb_summary(media_type, m),
        runtime,
        episodes,
        number_of_seasons,
        status,
    }
}

fn anime_summary(m: AniMedia) -> MediaSummary {
    MediaSummary {
        api_id: m.id,
        media_type: MediaType::Anime,
        title: m
            .title
            .as_ref()
            .and_then(AniTitle::preferred)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        overview: clean_overview(m.description),
        poster: m.cover_image.and_then(|c| non_empty(c.large)),
        release_date: m.start_date.as_ref().and_then(AniFuzzyDate::to_date_string),
        first_air_date: None,
        genres: m.genres.unwrap_or_default(),
        popularity: m.popularity,
    }
}

fn anime_detail(mut m: AniMedia) -> MediaDetail {
    let runtime = m.duration;
    let episodes = m.episodes;
    let status = m.status.take();
    MediaDetail {
        summary: anime_summary(m),
        runtime,
        episodes,
        number_of_seasons: None,
        status,
    }
}
