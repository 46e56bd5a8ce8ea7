use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::retry::{is_retryable_status, with_retry, RetryConfig, Retryable};

pub const NEWSDATA_API_BASE: &str = "https://newsdata.io/api/1";

/// newsdata.io sends timestamps as "2024-05-01 09:30:00" in UTC
const PUB_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum NewsApiError {
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("News service error ({code}): {message}")]
    Service { code: String, message: String },

    #[error("API key rejected by the news service")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl Retryable for NewsApiError {
    fn is_retryable(&self) -> bool {
        match self {
            NewsApiError::RequestFailed { status, .. } => {
                reqwest::StatusCode::from_u16(*status)
                    .map(is_retryable_status)
                    .unwrap_or(false)
            }
            NewsApiError::RateLimitExceeded => true,
            NewsApiError::NetworkError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsApiError>;

/// Parameters for the `/news` endpoint.
///
/// Everything is optional; an empty query returns the latest articles the
/// service has for the account's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsQuery {
    pub ids: Vec<String>,
    pub query: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub image_only: bool,
    pub remove_duplicates: bool,
    pub size: Option<u32>,
    pub page: Option<String>,
}

impl NewsQuery {
    /// Lookup of specific articles, ids end up comma-joined in one `id` param
    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// The filters the home and search screens always send
    pub fn headlines(language: &str, size: u32) -> Self {
        Self {
            language: Some(language.to_string()),
            image_only: true,
            remove_duplicates: true,
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.query = non_empty(q.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_empty(category.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = non_empty(country.into());
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = non_empty(page.into());
        self
    }

    /// Query string pairs, without the api key
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if !self.ids.is_empty() {
            params.push(("id", self.ids.join(",")));
        }
        if let Some(ref language) = self.language {
            params.push(("language", language.clone()));
        }
        if self.image_only {
            params.push(("image", "1".to_string()));
        }
        if self.remove_duplicates {
            params.push(("removeduplicate", "1".to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size", size.to_string()));
        }
        if let Some(ref category) = self.category {
            params.push(("category", category.clone()));
        }
        if let Some(ref country) = self.country {
            params.push(("country", country.clone()));
        }
        if let Some(ref q) = self.query {
            params.push(("q", q.clone()));
        }
        if let Some(ref page) = self.page {
            params.push(("page", page.clone()));
        }

        params
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub struct NewsDataClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl NewsDataClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, NEWSDATA_API_BASE.to_string(), None)
    }

    /// Custom endpoint (proxies, test servers) and optional request timeout.
    /// Without a timeout the reqwest default applies.
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("NewsDeck/0.1.0"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_config: RetryConfig::default(),
        })
    }

    /// Replace the retry policy used by `fetch_with_retry`
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// One request, no retries
    pub async fn fetch(&self, query: &NewsQuery) -> Result<NewsPage> {
        let url = format!("{}/news", self.base_url);
        let mut params = vec![("apikey", self.api_key.clone())];
        params.extend(query.to_params());

        debug!("GET {} ({} params)", url, params.len());
        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(NewsApiError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(NewsApiError::RateLimitExceeded);
        }

        let body = response.text().await?;

        if !status.is_success() {
            // The service usually explains itself in the body, prefer that
            return match parse_response(&body) {
                Err(err @ NewsApiError::Service { .. }) => Err(err),
                _ => Err(NewsApiError::RequestFailed {
                    status: status.as_u16(),
                    body,
                }),
            };
        }

        parse_response(&body)
    }

    /// Same as `fetch`, wrapped in the client's retry policy
    pub async fn fetch_with_retry(&self, query: &NewsQuery) -> Result<NewsPage> {
        with_retry(&self.retry_config, move || self.fetch(query)).await
    }
}

/// One page of results from `/news`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsPage {
    pub total_results: u64,
    pub results: Vec<NewsArticle>,
    pub next_page: Option<String>,
}

/// Article as newsdata.io serializes it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub article_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creator: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl NewsArticle {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.pub_date.as_deref()?;
        NaiveDateTime::parse_from_str(raw, PUB_DATE_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct RawResponse {
    status: String,
    #[serde(rename = "totalResults", default)]
    total_results: Option<u64>,
    #[serde(default)]
    results: serde_json::Value,
    #[serde(rename = "nextPage", default)]
    next_page: Option<String>,
}

#[derive(Deserialize, Default)]
struct ServiceErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: String,
}

/// Decode a `/news` body.
///
/// On failure newsdata.io keeps HTTP-ish shape but puts an object with
/// `message`/`code` where the results array normally is.
pub fn parse_response(body: &str) -> Result<NewsPage> {
    let raw: RawResponse = serde_json::from_str(body)?;

    if raw.status != "success" {
        let err: ServiceErrorBody = serde_json::from_value(raw.results).unwrap_or_default();
        return Err(NewsApiError::Service {
            code: err.code,
            message: err.message,
        });
    }

    let results: Vec<NewsArticle> = match raw.results {
        serde_json::Value::Null => Vec::new(),
        value => serde_json::from_value(value)?,
    };

    Ok(NewsPage {
        total_results: raw.total_results.unwrap_or(results.len() as u64),
        results,
        next_page: raw.next_page,
    })
}
