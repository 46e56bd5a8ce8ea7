// Breaking news, category lists, search and single-article lookups
use crate::{
    models::{Article, ArticleId},
    source::{ArticleSource, FeedPage, FeedRequest},
    Error, Result,
};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_BREAKING_SIZE: u32 = 5;

/// Search parameters as the discover screen collects them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
}

/// Front door for everything that isn't the saved list
pub struct NewsFeed {
    source: Arc<dyn ArticleSource>,
    language: String,
    page_size: u32,
    breaking_size: u32,
}

impl NewsFeed {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self {
            source,
            language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            breaking_size: DEFAULT_BREAKING_SIZE,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_sizes(mut self, page_size: u32, breaking_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self.breaking_size = breaking_size.max(1);
        self
    }

    /// Headlines for the carousel at the top of the home screen
    pub async fn breaking(&self) -> Result<Vec<Article>> {
        let request = FeedRequest::new(&self.language, self.breaking_size);
        let page = self.source.fetch_feed(&request).await?;
        info!("Fetched {} breaking stories", page.articles.len());
        Ok(page.articles)
    }

    /// Home list, optionally narrowed to a category. Empty category means all.
    pub async fn by_category(&self, category: &str, page: Option<String>) -> Result<FeedPage> {
        let mut request = FeedRequest::new(&self.language, self.page_size);
        request.category = non_blank(category);
        request.page = page;

        let page = self.source.fetch_feed(&request).await?;
        info!(
            "Fetched {} stories for category '{}'",
            page.articles.len(),
            category
        );
        Ok(page)
    }

    pub async fn search(&self, params: &SearchParams) -> Result<FeedPage> {
        let mut request = FeedRequest::new(&self.language, self.page_size);
        request.query = params.query.as_deref().and_then(non_blank);
        request.category = params.category.as_deref().and_then(non_blank);
        request.country = params.country.as_deref().and_then(non_blank);

        let page = self.source.fetch_feed(&request).await?;
        info!("Search returned {} stories", page.articles.len());
        Ok(page)
    }

    /// Detail view lookup
    pub async fn article(&self, id: &ArticleId) -> Result<Article> {
        let found = self
            .source
            .fetch_by_ids(std::slice::from_ref(id))
            .await?
            .into_iter()
            .find(|a| &a.id == id);

        found.ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
