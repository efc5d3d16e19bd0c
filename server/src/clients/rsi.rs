//! RSI pledge-store GraphQL client.
//!
//! The public browse endpoint only answers *batched* requests: the body
//! is a JSON array of operations and the response an array of results.
//! We always send exactly one operation and unwrap the first element; a
//! non-empty `errors` array is a failure even under HTTP 200.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{acquire, build_http_client, execute_json, token_bucket, DirectLimiter, HttpError};
use crate::config::RsiConfig;

/// Hard upstream limit for `query.limit`.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Product id of paint SKUs in the store catalog.
const PAINT_PRODUCT_ID: u32 = 268;

const BROWSE_QUERY: &str = "query GetBrowseItems($query: SearchQuery) { store(browse: true) { \
    listing: search(query: $query) { resources { id name title url type isPackage \
    media { thumbnail { storeSmall } } } count totalCount } } }";

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Serialize)]
struct BrowseVariables<'a> {
    query: SearchQuery<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery<'a> {
    page: u32,
    limit: u32,
    sort: SortInput<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ships: Option<ShipsInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skus: Option<SkusInput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<Vec<u32>>,
}

#[derive(Debug, Serialize)]
struct SortInput<'a> {
    field: &'a str,
    direction: &'a str,
}

#[derive(Debug, Serialize)]
struct ShipsInput {
    all: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkusInput<'a> {
    filters_from_tags: FiltersFromTags<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FiltersFromTags<'a> {
    facet_identifiers: Vec<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct BrowseData {
    store: StoreNode,
}

#[derive(Debug, Default, Deserialize)]
struct StoreNode {
    listing: Listing,
}

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default = "Vec::new")]
    resources: Vec<RsiResource>,
    #[serde(default, rename = "totalCount")]
    total_count: u32,
}

/// One store listing entry, ship or paint SKU.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsiResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "isPackage")]
    pub is_package: bool,
    #[serde(default)]
    pub media: Option<RsiMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsiMedia {
    #[serde(default)]
    pub thumbnail: Option<RsiThumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsiThumbnail {
    #[serde(default, rename = "storeSmall")]
    pub store_small: Option<String>,
}

impl RsiResource {
    /// The display name used for matching: `title` over `name`.
    pub fn display_name(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref()).map(str::trim)
    }

    /// The thumbnail URL, when the listing carries one.
    pub fn image_url(&self) -> Option<&str> {
        self.media
            .as_ref()?
            .thumbnail
            .as_ref()?
            .store_small
            .as_deref()
    }
}

/// One browse page: the resources plus the server-reported total.
#[derive(Debug, Clone)]
pub struct BrowsePage {
    pub resources: Vec<RsiResource>,
    pub total_count: u32,
}

/// The RSI surface the syncer consumes.
#[async_trait]
pub trait RsiApi: Send + Sync {
    /// One page of the ship catalog, sorted by name ascending.
    async fn browse_ships(
        &self,
        page: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<BrowsePage, HttpError>;

    /// One page of paint SKUs, sorted by weight descending.
    async fn browse_paint_skus(
        &self,
        page: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<BrowsePage, HttpError>;
}

/// Live GraphQL client over reqwest.
pub struct RsiClient {
    http: reqwest::Client,
    base_url: String,
    limiter: DirectLimiter,
}

impl RsiClient {
    pub fn new(config: &RsiConfig) -> Result<Self, HttpError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: token_bucket(config.rate_limit, config.rate_limit),
        })
    }

    /// Send one operation wrapped in a batch array and unwrap the first
    /// response element.
    async fn browse(
        &self,
        variables: BrowseVariables<'_>,
        cancel: &CancellationToken,
    ) -> Result<BrowsePage, HttpError> {
        acquire(&self.limiter, cancel).await?;

        let batch = [GraphQlRequest {
            operation_name: "GetBrowseItems",
            query: BROWSE_QUERY,
            variables,
        }];
        let url = format!("{}/graphql", self.base_url);
        let mut responses: Vec<GraphQlResponse<BrowseData>> =
            execute_json(self.http.post(&url).json(&batch), cancel).await?;

        if responses.is_empty() {
            return Err(HttpError::GraphQl("empty batch response".to_string()));
        }
        let first = responses.remove(0);
        if !first.errors.is_empty() {
            let messages: Vec<String> =
                first.errors.into_iter().map(|e| e.message).collect();
            return Err(HttpError::GraphQl(messages.join("; ")));
        }
        let listing = first
            .data
            .ok_or_else(|| HttpError::GraphQl("response carried no data".to_string()))?
            .store
            .listing;
        Ok(BrowsePage {
            resources: listing.resources,
            total_count: listing.total_count,
        })
    }
}

#[async_trait]
impl RsiApi for RsiClient {
    async fn browse_ships(
        &self,
        page: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<BrowsePage, HttpError> {
        let variables = BrowseVariables {
            query: SearchQuery {
                page,
                limit: limit.min(MAX_PAGE_LIMIT),
                sort: SortInput {
                    field: "name",
                    direction: "asc",
                },
                ships: Some(ShipsInput { all: true }),
                skus: None,
                products: None,
            },
        };
        self.browse(variables, cancel).await
    }

    async fn browse_paint_skus(
        &self,
        page: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<BrowsePage, HttpError> {
        let variables = BrowseVariables {
            query: SearchQuery {
                page,
                limit: limit.min(MAX_PAGE_LIMIT),
                sort: SortInput {
                    field: "weight",
                    direction: "desc",
                },
                ships: None,
                skus: Some(SkusInput {
                    filters_from_tags: FiltersFromTags {
                        facet_identifiers: vec!["paints"],
                    },
                }),
                products: Some(vec![PAINT_PRODUCT_ID]),
            },
        };
        self.browse(variables, cancel).await
    }
}
