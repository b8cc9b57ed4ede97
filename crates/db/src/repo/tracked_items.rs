use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use watchlog_core::types::{MediaType, NaturalKey, TrackedItem, WatchStatus};

const COLUMNS: &str = "id, api_id, media_type, title, poster, overview, release_date, \
     first_air_date, genres_json, release_year, status, rating, self_note, \
     watched_seasons_json, date_added, date_completed";

#[derive(Debug, sqlx::FromRow)]
pub struct TrackedItemRow {
    pub id: String,
    pub api_id: i64,
    pub media_type: String,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub genres_json: String,
    pub release_year: Option<i64>,
    pub status: String,
    pub rating: Option<i64>,
    pub self_note: Option<String>,
    pub watched_seasons_json: String,
    pub date_added: String,
    pub date_completed: Option<String>,
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp {raw:?}: {e}"))
}

impl TryFrom<TrackedItemRow> for TrackedItem {
    type Error = String;

    fn try_from(r: TrackedItemRow) -> Result<Self, Self::Error> {
        let media_type = MediaType::parse(&r.media_type)
            .ok_or_else(|| format!("unknown media type {:?}", r.media_type))?;
        let status =
            WatchStatus::parse(&r.status).ok_or_else(|| format!("unknown status {:?}", r.status))?;
        let genres: Vec<String> =
            serde_json::from_str(&r.genres_json).map_err(|e| format!("genres: {e}"))?;
        let watched_seasons: Vec<u32> = serde_json::from_str(&r.watched_seasons_json)
            .map_err(|e| format!("watched seasons: {e}"))?;

        Ok(TrackedItem {
            id: r.id,
            api_id: r.api_id,
            media_type,
            title: r.title,
            poster: r.poster,
            overview: r.overview,
            release_date: r.release_date,
            first_air_date: r.first_air_date,
            genres,
            release_year: r.release_year.and_then(|y| i32::try_from(y).ok()),
            status,
            rating: r.rating.and_then(|v| u8::try_from(v).ok()),
            self_note: r.self_note,
            watched_seasons,
            date_added: parse_ts(&r.date_added)?,
            date_completed: r.date_completed.as_deref().map(parse_ts).transpose()?,
        })
    }
}

/// All items of one user in list order.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<TrackedItemRow>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM tracked_item WHERE user_id = ? ORDER BY position");
    sqlx::query_as::<Sqlite, TrackedItemRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_key(
    pool: &SqlitePool,
    user_id: &str,
    key: NaturalKey,
) -> Result<Option<TrackedItemRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM tracked_item WHERE user_id = ? AND api_id = ? AND media_type = ?"
    );
    sqlx::query_as::<Sqlite, TrackedItemRow>(&sql)
        .bind(user_id)
        .bind(key.api_id)
        .bind(key.media_type.as_str())
        .fetch_optional(pool)
        .await
}

/// Replace a user's whole item collection. Call inside a transaction.
pub async fn replace_all(
    conn: &mut SqliteConnection,
    user_id: &str,
    items: &[TrackedItem],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tracked_item WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for (position, item) in items.iter().enumerate() {
        let genres = serde_json::to_string(&item.genres).unwrap_or_else(|_| "[]".into());
        let seasons =
            serde_json::to_string(&item.watched_seasons).unwrap_or_else(|_| "[]".into());

        sqlx::query(
            "INSERT INTO tracked_item (id, user_id, position, api_id, media_type, title, poster, \
             overview, release_date, first_air_date, genres_json, release_year, status, rating, \
             self_note, watched_seasons_json, date_added, date_completed) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(user_id)
        .bind(position as i64)
        .bind(item.api_id)
        .bind(item.media_type.as_str())
        .bind(&item.title)
        .bind(&item.poster)
        .bind(&item.overview)
        .bind(&item.release_date)
        .bind(&item.first_air_date)
        .bind(genres)
        .bind(item.release_year)
        .bind(item.status.as_str())
        .bind(item.rating.map(i64::from))
        .bind(&item.self_note)
        .bind(seasons)
        .bind(item.date_added.to_rfc3339())
        .bind(item.date_completed.map(|d| d.to_rfc3339()))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

const TEXT_DISPLAY_COLUMNS: [&str; 5] =
    ["title", "poster", "overview", "release_date", "first_air_date"];

fn nonblank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Fill blank display columns of one item in a single statement. Columns
/// holding a value and every user-owned column are left as they are.
/// Returns whether the row changed.
pub async fn fill_display_fields(
    pool: &SqlitePool,
    user_id: &str,
    item: &TrackedItem,
) -> Result<bool, sqlx::Error> {
    let texts = [
        nonblank(&item.title),
        nonblank(&item.poster),
        nonblank(&item.overview),
        nonblank(&item.release_date),
        nonblank(&item.first_air_date),
    ];
    let genres = (!item.genres.is_empty())
        .then(|| serde_json::to_string(&item.genres).ok())
        .flatten();

    let mut sets: Vec<String> = TEXT_DISPLAY_COLUMNS
        .iter()
        .map(|c| {
            format!(
                "{c} = CASE WHEN TRIM(COALESCE({c}, '')) = '' THEN COALESCE(?, {c}) ELSE {c} END"
            )
        })
        .collect();
    sets.push(
        "genres_json = CASE WHEN genres_json = '[]' THEN COALESCE(?, genres_json) ELSE genres_json END"
            .into(),
    );
    sets.push("release_year = COALESCE(release_year, ?)".into());

    let mut fillable: Vec<String> = TEXT_DISPLAY_COLUMNS
        .iter()
        .map(|c| format!("(TRIM(COALESCE({c}, '')) = '' AND ? IS NOT NULL)"))
        .collect();
    fillable.push("(genres_json = '[]' AND ? IS NOT NULL)".into());
    fillable.push("(release_year IS NULL AND ? IS NOT NULL)".into());

    let sql = format!(
        "UPDATE tracked_item SET {} WHERE user_id = ? AND id = ? AND ({})",
        sets.join(", "),
        fillable.join(" OR "),
    );

    let mut query = sqlx::query(&sql);
    for text in texts {
        query = query.bind(text);
    }
    query = query
        .bind(genres.as_deref())
        .bind(item.release_year)
        .bind(user_id)
        .bind(&item.id);
    for text in texts {
        query = query.bind(text);
    }
    let result = query
        .bind(genres.as_deref())
        .bind(item.release_year)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, user_id: &str, item_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tracked_item WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
