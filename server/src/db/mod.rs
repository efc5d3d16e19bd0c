//! Relational persistence for reference data, user fleets, and sync audit.
//!
//! The store speaks one SQL surface over two drivers. Queries are written
//! in the dialect both SQLite and PostgreSQL share (`$N` parameters, each
//! used exactly once in textual order, `ON CONFLICT`, `RETURNING`,
//! `COALESCE`/`NULLIF`); the handful of real divergences live in
//! [`dialect`]. Timestamps are RFC3339 UTC strings and boolean flags are
//! stored as 0/1 integers so both drivers round-trip them identically.

pub mod dialect;
pub mod fleet;
pub mod game_versions;
pub mod items;
pub mod lookups;
pub mod manufacturers;
pub mod paints;
pub mod pool;
pub mod schema;
pub mod sync_history;
pub mod users;
pub mod vehicles;

pub use dialect::Dialect;
pub use pool::{connect, Db};

use chrono::{SecondsFormat, Utc};

/// Current time as the canonical stored timestamp format.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// True for unique/foreign-key/check violations that a syncer should log
/// and skip rather than abort on.
pub(crate) fn is_constraint_violation(err: &sqlx::Error) -> bool {
    use sqlx::error::ErrorKind;
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
        ),
        _ => false,
    }
}
