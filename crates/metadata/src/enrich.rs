//! Fill missing display fields on tracked items from their catalog.

use futures::StreamExt;
use tracing::{debug, warn};
use watchlog_core::types::{TrackedItem, year_of};

use crate::MediaDetail;
use crate::normalize::UNKNOWN_TITLE;
use crate::provider::Catalogs;

pub const DEFAULT_CONCURRENCY: usize = 8;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

/// An item is worth a provider call when it has no title or no poster.
pub fn needs_enrichment(item: &TrackedItem) -> bool {
    is_blank(&item.title) || is_blank(&item.poster)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichSource {
    /// Nothing was missing.
    Unchanged,
    /// Missing fields were filled from the provider.
    Provider,
    /// The provider call failed; only the title fallback was applied.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enriched {
    pub item: TrackedItem,
    pub source: EnrichSource,
}

fn keep_or(target: &mut Option<String>, candidate: Option<String>) {
    if is_blank(target) {
        if let Some(value) = candidate.filter(|v| !v.trim().is_empty()) {
            *target = Some(value);
        }
    }
}

/// Fill only blank fields of `item` from `detail`.
pub fn merge(mut item: TrackedItem, detail: MediaDetail) -> TrackedItem {
    let summary = detail.summary;
    let provided_title = Some(summary.title).filter(|t| t != UNKNOWN_TITLE);

    keep_or(&mut item.title, provided_title);
    keep_or(&mut item.poster, summary.poster);
    keep_or(&mut item.overview, summary.overview);
    keep_or(&mut item.release_date, summary.release_date);
    keep_or(&mut item.first_air_date, summary.first_air_date);
    if item.genres.is_empty() {
        item.genres = summary.genres;
    }
    if item.release_year.is_none() {
        item.release_year = item
            .release_date
            .as_deref()
            .or(item.first_air_date.as_deref())
            .and_then(year_of);
    }
    item
}

fn with_title_fallback(mut item: TrackedItem) -> TrackedItem {
    if is_blank(&item.title) {
        item.title = Some(UNKNOWN_TITLE.to_string());
    }
    item
}

#[derive(Clone)]
pub struct Enricher {
    catalogs: Catalogs,
    concurrency: usize,
}

impl Enricher {
    pub fn new(catalogs: Catalogs, concurrency: usize) -> Self {
        Self {
            catalogs,
            concurrency: concurrency.max(1),
        }
    }

    /// Never fails: provider errors leave the item as it was, plus the
    /// title fallback.
    pub async fn enrich(&self, item: TrackedItem) -> Enriched {
        if !needs_enrichment(&item) {
            return Enriched {
                item,
                source: EnrichSource::Unchanged,
            };
        }

        let fetched = match self.catalogs.for_type(item.media_type) {
            Ok(provider) => provider.details(item.media_type, item.api_id).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(detail) => {
                debug!(item_id = %item.id, api_id = item.api_id, "enriched tracked item");
                Enriched {
                    item: with_title_fallback(merge(item, detail)),
                    source: EnrichSource::Provider,
                }
            }
            Err(e) => {
                warn!(
                    item_id = %item.id,
                    api_id = item.api_id,
                    media_type = %item.media_type,
                    error = %e,
                    "enrichment failed, keeping stored fields"
                );
                Enriched {
                    item: with_title_fallback(item),
                    source: EnrichSource::Fallback,
                }
            }
        }
    }

    /// Enrich every item with at most `concurrency` provider calls in flight.
    /// Output order matches input order.
    pub async fn enrich_all(&self, items: Vec<TrackedItem>) -> Vec<Enriched> {
        futures::stream::iter(items)
            .map(|item| self.enrich(item))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
