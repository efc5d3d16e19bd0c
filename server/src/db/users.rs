//! Database operations for the users table.

use sqlx::Row;

use super::{now_utc, Db};

/// The single-tenant default username created at first boot.
pub const DEFAULT_USERNAME: &str = "default";

/// Create the default user if missing and return its id.
pub async fn ensure_default_user(db: &Db) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let sql = format!(
        "{} users (username, created_at, updated_at) VALUES ($1, $2, $3){}",
        db.dialect.insert_ignore(),
        db.dialect.insert_ignore_suffix()
    );
    sqlx::query(&sql)
        .bind(DEFAULT_USERNAME)
        .bind(&now)
        .bind(&now)
        .execute(&db.pool)
        .await?;

    let row = sqlx::query("SELECT id FROM users WHERE username = $1")
        .bind(DEFAULT_USERNAME)
        .fetch_one(&db.pool)
        .await?;
    row.try_get(0)
}

/// Look up a user id by username.
pub async fn find_user_id(db: &Db, username: &str) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&db.pool)
        .await?;
    row.map(|r| r.try_get(0)).transpose()
}
