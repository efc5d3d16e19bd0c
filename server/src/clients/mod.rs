//! Rate-limited HTTP clients for the four upstream sources.
//!
//! All four clients share one contract: a realistic `User-Agent`, JSON
//! accept header, a 30 second request timeout, a 10 MiB response cap,
//! and bounded retry on HTTP 429 honoring `Retry-After`. Retry is
//! reserved for 429; any other failure surfaces immediately. Every
//! suspension point (send, sleep, rate-limit acquisition) wakes early on
//! cancellation.
//!
//! Each client hides behind a per-source trait so the syncers can be
//! driven by fakes in tests.

pub mod fleetyards;
pub mod rsi;
pub mod scunpacked;
pub mod wiki;

pub use fleetyards::{FleetyardsApi, FleetyardsClient};
pub use rsi::{RsiApi, RsiClient};
pub use scunpacked::{ScunpackedApi, ScunpackedClient};
pub use wiki::{WikiApi, WikiClient};

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::header;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// User agent presented to every upstream.
pub const USER_AGENT: &str = concat!("fleetdock/", env!("CARGO_PKG_VERSION"));

/// Maximum accepted response body size.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Attempts per request when the upstream answers 429.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff when a 429 carries no usable Retry-After.
const FALLBACK_BACKOFF: Duration = Duration::from_secs(5);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced by the upstream clients.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("http status {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to build request")]
    Build,

    #[error("invalid json payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response body exceeds {MAX_BODY_BYTES} bytes")]
    BodyTooLarge,

    #[error("rate limited after {MAX_ATTEMPTS} attempts")]
    RateLimited,

    #[error("graphql error: {0}")]
    GraphQl(String),

    #[error("cancelled")]
    Cancelled,
}

/// Non-keyed token bucket shared by the paced clients.
pub(crate) type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Build a token bucket from requests-per-second and burst capacity.
/// Zero values are clamped to one.
pub(crate) fn token_bucket(rps: u32, burst: u32) -> DirectLimiter {
    let rps = NonZeroU32::new(rps).unwrap_or(nonzero!(1u32));
    let burst = NonZeroU32::new(burst).unwrap_or(nonzero!(1u32));
    RateLimiter::direct(Quota::per_second(rps).allow_burst(burst))
}

/// Build the shared reqwest client.
pub(crate) fn build_http_client() -> Result<reqwest::Client, HttpError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Wait for a bucket token, waking early on cancellation.
pub(crate) async fn acquire(
    limiter: &DirectLimiter,
    cancel: &CancellationToken,
) -> Result<(), HttpError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(HttpError::Cancelled),
        _ = limiter.until_ready() => Ok(()),
    }
}

/// Sleep, waking early on cancellation.
pub(crate) async fn sleep_cancellable(
    cancel: &CancellationToken,
    duration: Duration,
) -> Result<(), HttpError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(HttpError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Send a request and decode the JSON response.
///
/// 429 responses are retried up to [`MAX_ATTEMPTS`] times, sleeping for
/// the advertised `Retry-After` seconds (or five seconds without one).
/// Any other non-2xx returns a structured error carrying the status and
/// a truncated body excerpt.
pub(crate) async fn execute_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<T, HttpError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let this_attempt = request.try_clone().ok_or(HttpError::Build)?;

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(HttpError::Cancelled),
            result = this_attempt.send() => result?,
        };

        let status = response.status();
        if status.as_u16() == 429 {
            if attempt >= MAX_ATTEMPTS {
                return Err(HttpError::RateLimited);
            }
            let wait = retry_after(&response).unwrap_or(FALLBACK_BACKOFF);
            tracing::debug!(attempt, wait_secs = wait.as_secs(), "throttled by upstream");
            sleep_cancellable(cancel, wait).await?;
            continue;
        }

        let bytes = read_capped(response).await?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                excerpt: excerpt(&bytes),
            });
        }
        return serde_json::from_slice(&bytes).map_err(HttpError::Decode);
    }
}

/// Parse a seconds-valued Retry-After header.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

async fn read_capped(response: reqwest::Response) -> Result<Vec<u8>, HttpError> {
    if let Some(length) = response.content_length() {
        if length as usize > MAX_BODY_BYTES {
            return Err(HttpError::BodyTooLarge);
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_BODY_BYTES {
        return Err(HttpError::BodyTooLarge);
    }
    Ok(bytes.to_vec())
}

/// At most 200 bytes of body, lossily decoded, for error messages.
fn excerpt(bytes: &[u8]) -> String {
    let cut = bytes.len().min(200);
    String::from_utf8_lossy(&bytes[..cut]).into_owned()
}
