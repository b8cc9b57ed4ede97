use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use watchlog_core::clock::{Clock, SystemClock};
use watchlog_metadata::anilist::AniListClient;
use watchlog_metadata::provider::{CatalogProvider, Catalogs};
use watchlog_metadata::tmdb::TmdbClient;
use watchlog_server::config::Config;
use watchlog_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    info!(db_path = %config.db_path, "connecting to database");

    let pool = watchlog_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    watchlog_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let movie_tv: Option<Arc<dyn CatalogProvider>> = match &config.tmdb_api_key {
        Some(key) => Some(Arc::new(
            TmdbClient::new(key.clone()).context("failed to build TMDB client")?,
        )),
        None => {
            warn!("TMDB_API_KEY not set, movie and tv discovery disabled");
            None
        }
    };
    let anime = Arc::new(AniListClient::new(clock.clone()).context("failed to build AniList client")?);

    let state = AppState::new(
        pool,
        config.jwt_secret.clone(),
        Catalogs::new(movie_tv, anime),
        clock,
        config.cache_ttl,
        config.enrich_concurrency,
    );
    let app = watchlog_server::routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
