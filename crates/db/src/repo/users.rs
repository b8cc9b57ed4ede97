use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sqlx::SqlitePool;

/// User row from the database.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_ts: i64,
}

type UserTuple = (String, String, String, String, i64);

fn row_to_user((id, email, username, password_hash, created_ts): UserTuple) -> UserRow {
    UserRow {
        id,
        email,
        username,
        password_hash,
        created_ts,
    }
}

/// Create a new user. Returns the user ID.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    username: &str,
    password: &str,
) -> Result<String, crate::DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let hash = hash_password(password)?;
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO user (id, email, username, password_hash, created_ts) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(username)
    .bind(&hash)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(crate::DbError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Find user by email.
pub async fn find_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row: Option<UserTuple> = sqlx::query_as(
        "SELECT id, email, username, password_hash, created_ts FROM user WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

/// Find user by ID.
pub async fn find_by_id(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row: Option<UserTuple> = sqlx::query_as(
        "SELECT id, email, username, password_hash, created_ts FROM user WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

/// Delete a user by ID. Tracked items go with it through the foreign key.
pub async fn delete_user(pool: &SqlitePool, user_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, crate::DbError> {
    let parsed = PasswordHash::new(hash).map_err(|e| crate::DbError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn hash_password(password: &str) -> Result<String, crate::DbError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| crate::DbError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}
