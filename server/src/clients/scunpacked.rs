//! Scunpacked data-repository client.
//!
//! Paint metadata lives as one JSON file per item in a GitHub repository.
//! The GitHub contents API lists the `items/` directory; each matching
//! file is then fetched raw through its `download_url`. A personal access
//! token is optional and only raises the GitHub rate allowance.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{build_http_client, execute_json, HttpError};
use crate::config::ScunpackedConfig;

const GITHUB_API: &str = "https://api.github.com";

/// One entry from a contents-API directory listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoFile {
    pub name: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// The fields we read out of a `paint_*.json` item file. The source data
/// switched casing conventions over time, hence the aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaintFile {
    #[serde(default, alias = "ClassName", alias = "className")]
    pub class_name: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "RequiredTags", alias = "requiredTags")]
    pub required_tags: Option<String>,
}

impl PaintFile {
    /// The first whitespace-separated tag starting with `Paint_`.
    pub fn paint_tag(&self) -> Option<&str> {
        self.required_tags
            .as_deref()?
            .split_whitespace()
            .find(|tag| tag.starts_with("Paint_"))
    }
}

/// The Scunpacked surface the paint syncer consumes.
#[async_trait]
pub trait ScunpackedApi: Send + Sync {
    /// List the `items/` directory of the data repository.
    async fn list_items(&self, cancel: &CancellationToken) -> Result<Vec<RepoFile>, HttpError>;

    /// Fetch and parse one item file by its download URL.
    async fn fetch_paint(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<PaintFile, HttpError>;
}

/// Live GitHub-backed client over reqwest.
pub struct ScunpackedClient {
    http: reqwest::Client,
    repo: String,
    branch: String,
    token: Option<String>,
}

impl ScunpackedClient {
    pub fn new(config: &ScunpackedConfig) -> Result<Self, HttpError> {
        Ok(Self {
            http: build_http_client()?,
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config
                .github_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ScunpackedApi for ScunpackedClient {
    async fn list_items(&self, cancel: &CancellationToken) -> Result<Vec<RepoFile>, HttpError> {
        let url = format!(
            "{}/repos/{}/contents/items?ref={}",
            GITHUB_API, self.repo, self.branch
        );
        execute_json(self.authorize(self.http.get(&url)), cancel).await
    }

    async fn fetch_paint(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<PaintFile, HttpError> {
        execute_json(self.authorize(self.http.get(url)), cancel).await
    }
}

/// True for file names the paint syncer should fetch.
pub fn is_paint_file(name: &str) -> bool {
    name.starts_with("paint_") && name.ends_with(".json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_file_filter() {
        assert!(is_paint_file("paint_890j_luminex.json"));
        assert!(!is_paint_file("weapon_gatling.json"));
        assert!(!is_paint_file("paint_readme.md"));
    }

    #[test]
    fn first_paint_tag_wins() {
        let file = PaintFile {
            required_tags: Some("Utility Paint_890j Paint_Other".to_string()),
            ..PaintFile::default()
        };
        assert_eq!(file.paint_tag(), Some("Paint_890j"));

        let none = PaintFile::default();
        assert_eq!(none.paint_tag(), None);
    }
}
