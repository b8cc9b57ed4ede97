use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use watchlog_core::clock::Clock;
use watchlog_db::SqliteStore;
use watchlog_metadata::cache::DiscoveryCache;
use watchlog_metadata::discover::DiscoveryService;
use watchlog_metadata::enrich::Enricher;
use watchlog_metadata::provider::Catalogs;
use watchlog_tracker::reconcile::ListEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub list: ListEngine,
    pub discovery: DiscoveryService,
    pub enricher: Enricher,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        jwt_secret: String,
        catalogs: Catalogs,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
        enrich_concurrency: usize,
    ) -> Self {
        let store = Arc::new(SqliteStore::new(db.clone()));
        let cache = Arc::new(DiscoveryCache::new(cache_ttl, clock.clone()));
        Self {
            db,
            jwt_secret,
            list: ListEngine::new(store, clock),
            discovery: DiscoveryService::new(catalogs.clone(), cache),
            enricher: Enricher::new(catalogs, enrich_concurrency),
        }
    }

    pub fn catalogs(&self) -> &Catalogs {
        self.discovery.catalogs()
    }
}
