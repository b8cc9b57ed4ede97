pub mod migrate;
pub mod repo;
pub mod store;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub use store::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("password hash error: {0}")]
    Hash(String),
    #[error("email already registered")]
    EmailTaken,
}

fn is_memory(db_path: &str) -> bool {
    db_path == ":memory:" || db_path.starts_with("sqlite::memory:")
}

/// Create a SQLite connection pool with WAL mode and foreign keys enabled.
pub async fn connect(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let memory = is_memory(db_path);

    if !memory {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let mut opts = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !memory {
        opts = opts.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    }

    // Every in-memory connection would otherwise open its own empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(if memory { 1 } else { 5 })
        .connect_with(opts)
        .await?;

    Ok(pool)
}
