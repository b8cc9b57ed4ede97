use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Catalog a tracked title belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    Anime,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [Self::Movie, Self::Tv, Self::Anime];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Anime => "anime",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            "anime" => Some(Self::Anime),
            _ => None,
        }
    }

    /// Season tracking only makes sense for episodic media.
    pub fn is_episodic(self) -> bool {
        !matches!(self, Self::Movie)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Watch status of a tracked item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum WatchStatus {
    #[default]
    PlanToWatch,
    Watching,
    Completed,
}

impl WatchStatus {
    pub const ALL: [WatchStatus; 3] = [Self::PlanToWatch, Self::Watching, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlanToWatch => "planToWatch",
            Self::Watching => "watching",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planToWatch" => Some(Self::PlanToWatch),
            "watching" => Some(Self::Watching),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (apiId, mediaType): identifies a title across users and providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalKey {
    pub api_id: i64,
    pub media_type: MediaType,
}

impl NaturalKey {
    pub fn new(api_id: i64, media_type: MediaType) -> Self {
        Self { api_id, media_type }
    }
}

/// A user's personal record of a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub id: String,
    pub api_id: i64,
    pub media_type: MediaType,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub release_year: Option<i32>,
    #[serde(default)]
    pub status: WatchStatus,
    pub rating: Option<u8>,
    pub self_note: Option<String>,
    #[serde(default)]
    pub watched_seasons: Vec<u32>,
    pub date_added: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
}

impl TrackedItem {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.api_id, self.media_type)
    }

    /// Copy display fields from `source` into the ones still blank here.
    /// User-owned fields are never touched. Returns whether anything changed.
    pub fn fill_display_fields(&mut self, source: &TrackedItem) -> bool {
        let mut changed = false;
        changed |= fill_string(&mut self.title, &source.title);
        changed |= fill_string(&mut self.poster, &source.poster);
        changed |= fill_string(&mut self.overview, &source.overview);
        changed |= fill_string(&mut self.release_date, &source.release_date);
        changed |= fill_string(&mut self.first_air_date, &source.first_air_date);
        if self.genres.is_empty() && !source.genres.is_empty() {
            self.genres = source.genres.clone();
            changed = true;
        }
        if self.release_year.is_none() && source.release_year.is_some() {
            self.release_year = source.release_year;
            changed = true;
        }
        changed
    }
}

fn fill_string(target: &mut Option<String>, source: &Option<String>) -> bool {
    let empty = target.as_deref().is_none_or(|s| s.trim().is_empty());
    match source {
        Some(value) if empty && !value.trim().is_empty() => {
            *target = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// Year from the leading four digits of an ISO-ish date ("2010-07-16" -> 2010).
pub fn year_of(date: &str) -> Option<i32> {
    date.get(..4).and_then(|y| y.parse().ok())
}

/// Display metadata a caller may attach when adding an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppliedMetadata {
    pub title: Option<String>,
    pub poster: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub release_year: Option<i32>,
}

/// Body of an add request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub api_id: Option<i64>,
    pub media_type: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub metadata: SuppliedMetadata,
}

/// Partial update of the user-editable fields of a tracked item.
///
/// Nullable fields use a double option: absent means "leave alone",
/// `null` means "clear".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub rating: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub self_note: Option<Option<String>>,
    #[serde(default)]
    pub watched_seasons: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_completed: Option<Option<DateTime<Utc>>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A user together with the tracked items it exclusively owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub id: String,
    pub username: String,
    pub email: String,
    pub tracked_items: Vec<TrackedItem>,
}

impl UserDocument {
    pub fn find_item(&self, item_id: &str) -> Option<&TrackedItem> {
        self.tracked_items.iter().find(|i| i.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut TrackedItem> {
        self.tracked_items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn find_by_key(&self, key: NaturalKey) -> Option<&TrackedItem> {
        self.tracked_items.iter().find(|i| i.natural_key() == key)
    }
}
