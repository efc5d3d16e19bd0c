//! FleetYards API client.
//!
//! FleetYards serves ship and paint imagery. Pagination is plain
//! `?page=N&perPage=50` with the final page signalled by a short count;
//! a 500 ms politeness sleep separates consecutive calls instead of a
//! token bucket.

use std::time::Duration;

use async_trait::async_trait;
use fleetdock_engine::ImageSet;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{build_http_client, execute_json, sleep_cancellable, HttpError};

const PER_PAGE: usize = 50;
const POLITENESS_SLEEP: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FyStoreImage {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FyMedia {
    #[serde(default, rename = "storeImage")]
    pub store_image: Option<FyStoreImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FyModel {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media: Option<FyMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FyPaint {
    pub name: String,
    #[serde(default)]
    pub media: Option<FyMedia>,
}

/// Pull the four image URLs out of a FleetYards media blob.
pub fn image_set_from_media(media: Option<&FyMedia>) -> ImageSet {
    match media.and_then(|m| m.store_image.as_ref()) {
        Some(store) => ImageSet {
            source: store.source.clone(),
            small: store.small.clone(),
            medium: store.medium.clone(),
            large: store.large.clone(),
        },
        None => ImageSet::default(),
    }
}

/// The FleetYards surface the image syncers consume.
#[async_trait]
pub trait FleetyardsApi: Send + Sync {
    /// Every model, fully paginated.
    async fn models(&self, cancel: &CancellationToken) -> Result<Vec<FyModel>, HttpError>;

    /// The paints FleetYards lists for one model slug.
    async fn model_paints(
        &self,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FyPaint>, HttpError>;
}

/// Live FleetYards client over reqwest.
pub struct FleetyardsClient {
    http: reqwest::Client,
    base_url: String,
}

impl FleetyardsClient {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FleetyardsApi for FleetyardsClient {
    async fn models(&self, cancel: &CancellationToken) -> Result<Vec<FyModel>, HttpError> {
        let mut collected = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}/models?page={}&perPage={}",
                self.base_url, page, PER_PAGE
            );
            let batch: Vec<FyModel> = execute_json(self.http.get(&url), cancel).await?;
            let done = batch.len() < PER_PAGE;
            collected.extend(batch);
            if done {
                break;
            }
            page += 1;
            sleep_cancellable(cancel, POLITENESS_SLEEP).await?;
        }
        Ok(collected)
    }

    async fn model_paints(
        &self,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FyPaint>, HttpError> {
        let url = format!("{}/models/{}/paints", self.base_url, slug);
        execute_json(self.http.get(&url), cancel).await
    }
}
