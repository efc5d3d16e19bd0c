//! Configuration management for the server.
//!
//! Everything is read from the environment once at startup; configuration
//! problems are fatal there and nowhere else. `DB_DRIVER` selects the
//! storage backend: `sqlite` (the default) builds a file URL from
//! `DB_PATH`, `postgres` requires `DATABASE_URL`.

use std::env;

use base64::Engine as _;
use secrecy::SecretString;

/// Runtime environment, relaxing or tightening validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

/// Star Citizen Wiki source settings.
#[derive(Debug, Clone)]
pub struct WikiConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Token-bucket refill rate, requests per second.
    pub rate_limit: u32,
    /// Token-bucket burst capacity.
    pub burst: u32,
}

/// RSI pledge-store GraphQL settings.
#[derive(Debug, Clone)]
pub struct RsiConfig {
    pub enabled: bool,
    pub base_url: String,
    pub rate_limit: u32,
}

/// Scunpacked GitHub-repo source settings.
#[derive(Debug)]
pub struct ScunpackedConfig {
    /// `owner/name` of the data repository.
    pub repo: String,
    pub branch: String,
    pub github_token: Option<SecretString>,
}

/// Server configuration loaded from environment variables.
#[derive(Debug)]
pub struct Config {
    pub app_env: AppEnv,
    /// Connection URL for the selected driver.
    pub database_url: String,
    pub sc_wiki: WikiConfig,
    pub fleetyards_base_url: String,
    pub rsi: RsiConfig,
    pub scunpacked: ScunpackedConfig,
    /// Run the sync chain at boot when the reference tables are empty.
    pub sync_on_startup: bool,
    /// Five cron expressions, one per source, in pipeline order.
    pub sync_schedule: Vec<String>,
    /// 32-byte key for user LLM-config encryption; opaque here beyond
    /// validation.
    pub encryption_key: Option<SecretString>,
}

/// Staggered defaults: one source per quarter hour starting 03:00 UTC.
const DEFAULT_SCHEDULE: [&str; 5] = [
    "0 0 3 * * *",
    "0 15 3 * * *",
    "0 30 3 * * *",
    "0 45 3 * * *",
    "0 0 4 * * *",
];

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => AppEnv::Production,
            _ => AppEnv::Development,
        };

        let database_url = match env::var("DB_DRIVER").unwrap_or_else(|_| "sqlite".into()).as_str()
        {
            "postgres" => env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?,
            "sqlite" => {
                let path = env::var("DB_PATH").unwrap_or_else(|_| "fleetdock.db".into());
                format!("sqlite://{path}?mode=rwc")
            }
            other => return Err(ConfigError::UnknownDriver(other.to_string())),
        };

        let sc_wiki = WikiConfig {
            enabled: env_bool("SC_WIKI_ENABLED", true)?,
            base_url: env::var("SC_WIKI_BASE_URL")
                .unwrap_or_else(|_| "https://api.star-citizen.wiki/api/v2".into()),
            rate_limit: env_u32("SC_WIKI_RATE_LIMIT", 5)?,
            burst: env_u32("SC_WIKI_BURST", 10)?,
        };

        let fleetyards_base_url = env::var("FLEETYARDS_BASE_URL")
            .unwrap_or_else(|_| "https://api.fleetyards.net/v1".into());

        let rsi = RsiConfig {
            enabled: env_bool("RSI_API_ENABLED", true)?,
            base_url: env::var("RSI_BASE_URL")
                .unwrap_or_else(|_| "https://robertsspaceindustries.com".into()),
            rate_limit: env_u32("RSI_RATE_LIMIT", 2)?,
        };

        let scunpacked = ScunpackedConfig {
            repo: env::var("SCUNPACKED_REPO").unwrap_or_else(|_| "scunpacked/scunpacked-data".into()),
            branch: env::var("SCUNPACKED_BRANCH").unwrap_or_else(|_| "master".into()),
            github_token: env::var("GITHUB_TOKEN").ok().map(SecretString::from),
        };

        let sync_schedule = match env::var("SYNC_SCHEDULE") {
            Ok(raw) => {
                let entries: Vec<String> =
                    raw.split(',').map(|s| s.trim().to_string()).collect();
                if entries.len() != 5 || entries.iter().any(String::is_empty) {
                    return Err(ConfigError::InvalidSchedule(raw));
                }
                entries
            }
            Err(_) => DEFAULT_SCHEDULE.iter().map(|s| s.to_string()).collect(),
        };

        let encryption_key = match env::var("ENCRYPTION_KEY") {
            Ok(raw) => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(raw.as_bytes())
                    .map_err(|_| ConfigError::InvalidEncryptionKey)?;
                if decoded.len() != 32 {
                    return Err(ConfigError::InvalidEncryptionKey);
                }
                Some(SecretString::from(raw))
            }
            Err(_) => None,
        };
        if app_env == AppEnv::Production && encryption_key.is_none() {
            return Err(ConfigError::MissingEncryptionKey);
        }

        Ok(Self {
            app_env,
            database_url,
            sc_wiki,
            fleetyards_base_url,
            rsi,
            scunpacked,
            sync_on_startup: env_bool("SYNC_ON_STARTUP", false)?,
            sync_schedule,
            encryption_key,
        })
    }
}

fn env_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

fn env_u32(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is required when DB_DRIVER=postgres")]
    MissingDatabaseUrl,

    #[error("unknown DB_DRIVER '{0}', expected sqlite or postgres")]
    UnknownDriver(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("SYNC_SCHEDULE must hold five comma-separated cron expressions, got '{0}'")]
    InvalidSchedule(String),

    #[error("ENCRYPTION_KEY must be 32 bytes of standard base64")]
    InvalidEncryptionKey,

    #[error("ENCRYPTION_KEY is required in production")]
    MissingEncryptionKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_parsing() {
        std::env::set_var("FLEETDOCK_TEST_BOOL", "true");
        assert!(env_bool("FLEETDOCK_TEST_BOOL", false).unwrap());
        std::env::set_var("FLEETDOCK_TEST_BOOL", "off");
        assert!(!env_bool("FLEETDOCK_TEST_BOOL", true).unwrap());
        std::env::set_var("FLEETDOCK_TEST_BOOL", "maybe");
        assert!(env_bool("FLEETDOCK_TEST_BOOL", true).is_err());
        std::env::remove_var("FLEETDOCK_TEST_BOOL");
        assert!(env_bool("FLEETDOCK_TEST_BOOL", true).unwrap());
    }

    #[test]
    fn default_schedule_is_staggered() {
        let all: std::collections::HashSet<&str> = DEFAULT_SCHEDULE.into_iter().collect();
        assert_eq!(all.len(), 5);
    }
}
