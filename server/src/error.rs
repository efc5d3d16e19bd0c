//! Unified error handling for the server.

use crate::clients::HttpError;
use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("upstream error: {0}")]
    Http(#[from] HttpError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Another sync holds the single-flight guard. Callers fail fast and
    /// never queue behind a running sync.
    #[error("sync_in_progress")]
    SyncInProgress,

    /// The per-run budget elapsed or the run was cancelled; recorded
    /// verbatim in the sync_history row.
    #[error("context_deadline_exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Fold cancellation-shaped failures into the deadline error so the
    /// audit row always carries the same marker.
    pub fn normalize_cancellation(self) -> Self {
        match self {
            Error::Http(HttpError::Cancelled) => Error::DeadlineExceeded,
            other => other,
        }
    }
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;
