//! In-memory filter and sort over an already loaded list.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use watchlog_core::types::{MediaType, TrackedItem, WatchStatus};

/// Optional predicates, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub media_type: Option<MediaType>,
    pub status: Option<WatchStatus>,
    pub min_rating: Option<u8>,
    pub max_rating: Option<u8>,
}

impl FilterCriteria {
    pub fn matches(&self, item: &TrackedItem) -> bool {
        if self.media_type.is_some_and(|t| t != item.media_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != item.status) {
            return false;
        }
        // An unrated item never satisfies a rating bound.
        if let Some(min) = self.min_rating {
            if item.rating.is_none_or(|r| r < min) {
                return false;
            }
        }
        if let Some(max) = self.max_rating {
            if item.rating.is_none_or(|r| r > max) {
                return false;
            }
        }
        true
    }
}

pub fn filter(items: Vec<TrackedItem>, criteria: &FilterCriteria) -> Vec<TrackedItem> {
    items
        .into_iter()
        .filter(|item| criteria.matches(item))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    DateAdded,
    Rating,
    DateCompleted,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dateAdded" => Some(Self::DateAdded),
            "rating" => Some(Self::Rating),
            "dateCompleted" => Some(Self::DateCompleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Stable sort: items with equal keys keep their input order in both
/// directions. Missing ratings sort as 0, missing completion dates as the
/// Unix epoch.
pub fn sort(items: &mut [TrackedItem], key: SortKey, direction: SortDirection) {
    items.sort_by(|a, b| {
        let ord = match key {
            SortKey::DateAdded => a.date_added.cmp(&b.date_added),
            SortKey::Rating => a.rating.unwrap_or(0).cmp(&b.rating.unwrap_or(0)),
            SortKey::DateCompleted => completed_at(a).cmp(&completed_at(b)),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn completed_at(item: &TrackedItem) -> DateTime<Utc> {
    item.date_completed.unwrap_or(DateTime::UNIX_EPOCH)
}
