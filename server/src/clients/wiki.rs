//! Star Citizen Wiki API client.
//!
//! The wiki is the primary data source: manufacturers, game versions,
//! vehicles (with ports and loaners), and the item taxonomies. Endpoints
//! are page-numbered; we follow `meta.last_page` when present and stop on
//! the first empty page otherwise. Calls are paced by a configurable
//! token bucket.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{acquire, build_http_client, execute_json, token_bucket, DirectLimiter, HttpError};
use crate::config::WikiConfig;

const PAGE_SIZE: u32 = 50;

/// One page of any wiki listing.
#[derive(Debug, Deserialize)]
struct ApiPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    current_page: u32,
    last_page: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiManufacturer {
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiGameVersion {
    pub uuid: Option<String>,
    pub code: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub released_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiCrew {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiSpeed {
    #[serde(default)]
    pub scm: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiManufacturerRef {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiPort {
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub size_min: Option<i64>,
    #[serde(default)]
    pub size_max: Option<i64>,
    #[serde(default, rename = "type")]
    pub port_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiLoaner {
    #[serde(default)]
    pub slug: Option<String>,
}

/// A vehicle payload from the wiki. Image URLs are deliberately absent:
/// images come from the dedicated image sources, never from here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiVehicle {
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub beam: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub cargo_capacity: Option<f64>,
    #[serde(default)]
    pub crew: WikiCrew,
    #[serde(default)]
    pub speed: WikiSpeed,
    #[serde(default)]
    pub pledge_price: Option<f64>,
    #[serde(default)]
    pub pledge_url: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<WikiManufacturerRef>,
    #[serde(default, rename = "type")]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub production_status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub ports: Vec<WikiPort>,
    #[serde(default)]
    pub loaners: Vec<WikiLoaner>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WikiItem {
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub manufacturer_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The wiki surface the syncer consumes.
#[async_trait]
pub trait WikiApi: Send + Sync {
    async fn manufacturers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<WikiManufacturer>, HttpError>;

    async fn game_versions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<WikiGameVersion>, HttpError>;

    async fn vehicles(&self, cancel: &CancellationToken) -> Result<Vec<WikiVehicle>, HttpError>;

    /// One of the item taxonomies, by endpoint segment ("components",
    /// "fps-weapons", ...).
    async fn items(
        &self,
        category: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<WikiItem>, HttpError>;
}

/// Live wiki client over reqwest.
pub struct WikiClient {
    http: reqwest::Client,
    base_url: String,
    limiter: DirectLimiter,
}

impl WikiClient {
    pub fn new(config: &WikiConfig) -> Result<Self, HttpError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: token_bucket(config.rate_limit, config.burst),
        })
    }

    /// Follow a paginated listing to the end.
    async fn fetch_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, HttpError> {
        let mut collected = Vec::new();
        let mut page = 1u32;
        loop {
            acquire(&self.limiter, cancel).await?;
            let url = format!(
                "{}/{}?page={}&limit={}",
                self.base_url, path, page, PAGE_SIZE
            );
            let body: ApiPage<T> = execute_json(self.http.get(&url), cancel).await?;
            if body.data.is_empty() {
                break;
            }
            collected.extend(body.data);
            match body.meta {
                Some(meta) if meta.current_page < meta.last_page => page += 1,
                Some(_) => break,
                None => page += 1,
            }
        }
        Ok(collected)
    }
}

#[async_trait]
impl WikiApi for WikiClient {
    async fn manufacturers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<WikiManufacturer>, HttpError> {
        self.fetch_paged("manufacturers", cancel).await
    }

    async fn game_versions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<WikiGameVersion>, HttpError> {
        self.fetch_paged("game-versions", cancel).await
    }

    async fn vehicles(&self, cancel: &CancellationToken) -> Result<Vec<WikiVehicle>, HttpError> {
        self.fetch_paged("vehicles", cancel).await
    }

    async fn items(
        &self,
        category: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<WikiItem>, HttpError> {
        self.fetch_paged(category, cancel).await
    }
}
