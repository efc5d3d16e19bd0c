//! The small set of SQL differences between SQLite and PostgreSQL.
//!
//! Both drivers accept `$N` parameters, `ON CONFLICT`, and `RETURNING`,
//! so ordinary queries are written once. What remains dialect-specific:
//! auto-increment primary-key DDL, the insert-and-ignore spelling, and
//! SQLite's connection PRAGMAs (applied in [`crate::db::pool`]).

/// The storage backend behind the shared pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Detect the dialect from a connection URL.
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Dialect::Postgres
        } else {
            Dialect::Sqlite
        }
    }

    /// DDL for an auto-incrementing integer primary key column.
    pub fn auto_pk(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Postgres => "BIGSERIAL PRIMARY KEY",
        }
    }

    /// Leading keywords for an insert that skips conflicting rows.
    /// Pair with [`Dialect::insert_ignore_suffix`].
    pub fn insert_ignore(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INSERT OR IGNORE INTO",
            Dialect::Postgres => "INSERT INTO",
        }
    }

    /// Trailing clause companion to [`Dialect::insert_ignore`].
    pub fn insert_ignore_suffix(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "",
            Dialect::Postgres => " ON CONFLICT DO NOTHING",
        }
    }

    /// `$start .. $start+count-1` as a comma-separated placeholder list,
    /// for dynamic-width `IN (...)` clauses.
    pub fn placeholders(&self, start: usize, count: usize) -> String {
        (start..start + count)
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert_eq!(Dialect::from_url("postgres://u@h/db"), Dialect::Postgres);
        assert_eq!(Dialect::from_url("postgresql://u@h/db"), Dialect::Postgres);
        assert_eq!(Dialect::from_url("sqlite://dev.db?mode=rwc"), Dialect::Sqlite);
        assert_eq!(Dialect::from_url("dev.db"), Dialect::Sqlite);
    }

    #[test]
    fn placeholder_lists() {
        assert_eq!(Dialect::Sqlite.placeholders(1, 3), "$1, $2, $3");
        assert_eq!(Dialect::Postgres.placeholders(4, 2), "$4, $5");
        assert_eq!(Dialect::Sqlite.placeholders(1, 0), "");
    }

    #[test]
    fn insert_ignore_round_trip() {
        let d = Dialect::Postgres;
        let sql = format!("{} t (a) VALUES ($1){}", d.insert_ignore(), d.insert_ignore_suffix());
        assert_eq!(sql, "INSERT INTO t (a) VALUES ($1) ON CONFLICT DO NOTHING");
    }
}
