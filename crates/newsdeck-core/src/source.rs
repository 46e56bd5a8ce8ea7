use crate::{
    models::{Article, ArticleId},
    Result,
};

/// What a feed screen asks the news service for
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub query: Option<String>,
    /// Comma-joined category slugs, `None` for all categories
    pub category: Option<String>,
    /// Comma-joined country codes, `None` for all countries
    pub country: Option<String>,
    pub language: String,
    pub size: u32,
    pub page: Option<String>,
}

impl FeedRequest {
    pub fn new(language: impl Into<String>, size: u32) -> Self {
        Self {
            query: None,
            category: None,
            country: None,
            language: language.into(),
            size,
            page: None,
        }
    }
}

/// One page of feed results plus the cursor for the next one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub articles: Vec<Article>,
    pub next_page: Option<String>,
}

/// Trait for article sources - the seam between the app and the news API
///
/// The newsdata.io provider implements this; tests swap in mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Batched lookup. Single attempt; ids the service can't serve are
    /// simply absent from the result.
    async fn fetch_by_ids(&self, ids: &[ArticleId]) -> Result<Vec<Article>>;

    async fn fetch_feed(&self, request: &FeedRequest) -> Result<FeedPage>;
}
