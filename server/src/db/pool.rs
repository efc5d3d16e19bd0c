//! Database connection pool management.

use std::sync::Once;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use super::dialect::Dialect;

static DRIVERS: Once = Once::new();

/// A connection pool plus the dialect it speaks.
#[derive(Debug, Clone)]
pub struct Db {
    pub pool: AnyPool,
    pub dialect: Dialect,
}

/// Create a new database connection pool for the given URL.
///
/// SQLite connections get WAL journaling, enforced foreign keys, and a
/// busy timeout applied as they join the pool.
pub async fn connect(database_url: &str) -> Result<Db, sqlx::Error> {
    DRIVERS.call_once(sqlx::any::install_default_drivers);

    let dialect = Dialect::from_url(database_url);
    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if dialect == Dialect::Sqlite {
                    sqlx::query("PRAGMA journal_mode=WAL;").execute(&mut *conn).await?;
                    sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await?;
                    sqlx::query("PRAGMA busy_timeout=5000;").execute(&mut *conn).await?;
                }
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    Ok(Db { pool, dialect })
}
