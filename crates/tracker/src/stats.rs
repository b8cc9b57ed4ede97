//! Aggregate statistics over a user's whole list.

use std::collections::BTreeMap;

use serde::Serialize;
use watchlog_core::types::{MediaType, TrackedItem, WatchStatus, year_of};

pub const SHORTLIST_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub by_media_type: BTreeMap<MediaType, usize>,
    pub by_status: BTreeMap<WatchStatus, usize>,
    pub average_rating: Option<f64>,
    pub average_rating_by_media_type: BTreeMap<MediaType, Option<f64>>,
    pub genre_distribution: BTreeMap<String, usize>,
    pub release_year_distribution: BTreeMap<i32, usize>,
    /// Completed items, most recently completed first.
    pub recently_completed: Vec<TrackedItem>,
    /// Items being watched, most recently added first.
    pub currently_watching: Vec<TrackedItem>,
}

/// The short summary served next to the list itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub total: usize,
    pub by_status: BTreeMap<WatchStatus, usize>,
    pub avg_rating: Option<f64>,
}

#[derive(Default)]
struct Mean {
    sum: u64,
    count: u64,
}

impl Mean {
    fn push(&mut self, value: u8) {
        self.sum += u64::from(value);
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

fn status_counts(items: &[TrackedItem]) -> BTreeMap<WatchStatus, usize> {
    let mut counts: BTreeMap<WatchStatus, usize> =
        WatchStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for item in items {
        *counts.entry(item.status).or_default() += 1;
    }
    counts
}

pub fn summary(items: &[TrackedItem]) -> ListSummary {
    let mut mean = Mean::default();
    for rating in items.iter().filter_map(|i| i.rating) {
        mean.push(rating);
    }
    ListSummary {
        total: items.len(),
        by_status: status_counts(items),
        avg_rating: mean.value(),
    }
}

pub fn dashboard(items: &[TrackedItem]) -> DashboardStats {
    let mut by_media_type: BTreeMap<MediaType, usize> =
        MediaType::ALL.iter().map(|t| (*t, 0)).collect();
    let mut overall = Mean::default();
    let mut per_type: BTreeMap<MediaType, Mean> = BTreeMap::new();
    let mut genre_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut release_year_distribution: BTreeMap<i32, usize> = BTreeMap::new();

    for item in items {
        *by_media_type.entry(item.media_type).or_default() += 1;

        if let Some(rating) = item.rating {
            overall.push(rating);
            per_type.entry(item.media_type).or_default().push(rating);
        }

        for genre in &item.genres {
            *genre_distribution.entry(genre.clone()).or_default() += 1;
        }

        let year = item.release_year.or_else(|| {
            item.release_date
                .as_deref()
                .or(item.first_air_date.as_deref())
                .and_then(year_of)
        });
        if let Some(year) = year {
            *release_year_distribution.entry(year).or_default() += 1;
        }
    }

    let average_rating_by_media_type = MediaType::ALL
        .iter()
        .map(|t| (*t, per_type.get(t).and_then(Mean::value)))
        .collect();

    let mut recently_completed: Vec<TrackedItem> = items
        .iter()
        .filter(|i| i.status == WatchStatus::Completed && i.date_completed.is_some())
        .cloned()
        .collect();
    recently_completed.sort_by(|a, b| b.date_completed.cmp(&a.date_completed));
    recently_completed.truncate(SHORTLIST_LEN);

    let mut currently_watching: Vec<TrackedItem> = items
        .iter()
        .filter(|i| i.status == WatchStatus::Watching)
        .cloned()
        .collect();
    currently_watching.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    currently_watching.truncate(SHORTLIST_LEN);

    DashboardStats {
        total: items.len(),
        by_media_type,
        by_status: status_counts(items),
        average_rating: overall.value(),
        average_rating_by_media_type,
        genre_distribution,
        release_year_distribution,
        recently_completed,
        currently_watching,
    }
}
