//! VWorld data API feature fetcher.
//!
//! Issues `GetFeature` requests against the data API and unwraps the
//! response envelope:
//!
//! ```text
//! { "response": { "status": "OK",
//!                 "page": { "total": "1", "current": "1" },
//!                 "result": { "featureCollection": { "features": [...] } } } }
//! ```
//!
//! Transport failures and non-200 statuses are retried through
//! [`crate::retry`]. A body that does not have the envelope shape is a
//! [`SourceError::Structure`] and is surfaced immediately. Results spanning
//! several pages are fetched page by page up to
//! [`FetchConfig::max_pages`]. A failure on a later page keeps the
//! features already fetched.

use std::time::Duration;

use airzone_source_models::FeatureQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::retry::{self, RetryPolicy};
use crate::{FeatureSource, SourceError};

/// Default data API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.vworld.kr/req/data";

/// Fetcher settings. Passed in at construction; nothing is read from the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Data API endpoint.
    pub base_url: String,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Attempts per request.
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Upper bound on pages fetched for one query.
    pub max_pages: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: 5_000,
            user_agent: concat!("airzone/", env!("CARGO_PKG_VERSION")).to_string(),
            max_pages: 10,
        }
    }
}

impl FetchConfig {
    /// Per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy derived from the attempt count and delay.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// One decoded page of the response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePage {
    /// Raw features of this page.
    pub features: Vec<Value>,
    /// 1-based page number reported by the API.
    pub current: u32,
    /// Total page count reported by the API.
    pub total_pages: u32,
}

/// Fetches airspace features from the VWorld data API.
#[derive(Debug, Clone)]
pub struct VworldFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl VworldFetcher {
    /// Builds a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetches one page of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::RetriesExhausted`] when every attempt failed
    /// at the transport/HTTP level, or [`SourceError::Structure`] when the
    /// body is not the expected envelope.
    pub async fn fetch_page(&self, query: &FeatureQuery) -> Result<FeaturePage, SourceError> {
        let params = query.params();
        let body = retry::send_text(
            || self.client.get(&self.config.base_url).query(&params),
            &self.config.retry_policy(),
        )
        .await?;
        parse_envelope(&body)
    }
}

#[async_trait]
impl FeatureSource for VworldFetcher {
    fn name(&self) -> &str {
        "vworld"
    }

    async fn fetch(&self, query: &FeatureQuery) -> Result<Vec<Value>, SourceError> {
        if !query.credentials.is_present() {
            return Err(SourceError::MissingCredentials);
        }

        let mut features = Vec::new();
        let mut page_query = query.clone();

        loop {
            let page = match self.fetch_page(&page_query).await {
                Ok(page) => page,
                Err(e) if page_query.page > query.page => {
                    log::warn!(
                        "{}: page {} failed, keeping {} features from earlier pages: {e}",
                        query.dataset,
                        page_query.page,
                        features.len()
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            log::info!(
                "{}: page {}/{} returned {} features",
                query.dataset,
                page.current,
                page.total_pages,
                page.features.len()
            );

            let last_page = page.features.is_empty() || page_query.page >= page.total_pages;
            features.extend(page.features);

            if last_page {
                break;
            }
            if page_query.page >= self.config.max_pages {
                log::warn!(
                    "{}: stopping at the {}-page cap, {} of {} pages fetched",
                    query.dataset,
                    self.config.max_pages,
                    page_query.page,
                    page.total_pages
                );
                break;
            }
            page_query.page += 1;
        }

        Ok(features)
    }
}

/// Decodes a response body into a [`FeaturePage`].
///
/// An explicitly empty `features` array is a valid, empty page.
///
/// # Errors
///
/// Returns [`SourceError::Structure`] if the body is not JSON or any
/// envelope level is missing. When the API reports `"status": "ERROR"`
/// its error text is included in the message.
pub fn parse_envelope(body: &str) -> Result<FeaturePage, SourceError> {
    let json: Value = serde_json::from_str(body).map_err(|e| SourceError::Structure {
        message: format!("response body is not JSON: {e}"),
    })?;

    let response = descend(&json, "response", "response")?;
    let status = response
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN");

    if status == "ERROR" {
        let text = response
            .pointer("/error/text")
            .and_then(Value::as_str)
            .unwrap_or("no error text");
        return Err(SourceError::Structure {
            message: format!("upstream reported an error: {text}"),
        });
    }

    let result = descend(response, "result", "response.result").map_err(|e| match e {
        SourceError::Structure { message } => SourceError::Structure {
            message: format!("{message} (status: {status})"),
        },
        other => other,
    })?;
    let collection = descend(result, "featureCollection", "response.result.featureCollection")?;
    let features = descend(
        collection,
        "features",
        "response.result.featureCollection.features",
    )?
    .as_array()
    .ok_or_else(|| SourceError::Structure {
        message: "response.result.featureCollection.features is not an array".to_string(),
    })?
    .clone();

    let current = page_number(response.pointer("/page/current")).unwrap_or(1);
    let total_pages = page_number(response.pointer("/page/total")).unwrap_or(current);

    Ok(FeaturePage {
        features,
        current,
        total_pages,
    })
}

fn descend<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value, SourceError> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| SourceError::Structure {
            message: format!("missing `{path}`"),
        })
}

/// Page numbers arrive as strings (`"3"`) or numbers.
fn page_number(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}
