//! Process-local TTL cache for discovery results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;
use watchlog_core::clock::Clock;
use watchlog_core::types::MediaType;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search {
        media_type: Option<MediaType>,
        query: String,
    },
    Trending(MediaType),
    Latest(MediaType),
}

struct Entry {
    stored_at: DateTime<Utc>,
    value: Value,
}

/// Values are stored as JSON so one cache can hold every result shape.
pub struct DiscoveryCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl DiscoveryCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    /// A live entry, or `None` when missing or past its TTL.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let now = self.clock.now();
        let value = {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            if now - entry.stored_at >= self.ttl {
                None
            } else {
                Some(entry.value.clone())
            }
        };

        let Some(value) = value else {
            let mut entries = self.entries.write();
            // Another request may have refreshed it since the read.
            if entries.get(key).is_some_and(|e| now - e.stored_at >= self.ttl) {
                entries.remove(key);
            }
            return None;
        };
        serde_json::from_value(value).ok()
    }

    /// Store a value, sweeping every expired entry on the way.
    pub fn insert<T: Serialize>(&self, key: CacheKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                let stored_at = self.clock.now();
                let mut entries = self.entries.write();
                entries.retain(|_, e| stored_at - e.stored_at < self.ttl);
                entries.insert(key, Entry { stored_at, value });
            }
            Err(e) => warn!(?key, error = %e, "failed to cache discovery result"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
