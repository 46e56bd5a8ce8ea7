// newsdata.io provider - bridges the API client with the ArticleSource trait
use async_trait::async_trait;
use newsdeck_api::{NewsApiError, NewsArticle, NewsDataClient, NewsQuery};

use crate::{
    models::{Article, ArticleId},
    source::{ArticleSource, FeedPage, FeedRequest},
    Error, Result,
};

/// Wrapper around NewsDataClient that implements ArticleSource
pub struct NewsDataProvider {
    client: NewsDataClient,
}

impl NewsDataProvider {
    pub fn new(client: NewsDataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleSource for NewsDataProvider {
    async fn fetch_by_ids(&self, ids: &[ArticleId]) -> Result<Vec<Article>> {
        let query = NewsQuery::by_ids(ids.iter().map(|id| id.as_str()));

        // no retry here, a failed lookup is reported and the user re-focuses
        let page = self.client.fetch(&query).await.map_err(fetch_failed)?;

        Ok(page.results.into_iter().map(newsdata_to_article).collect())
    }

    async fn fetch_feed(&self, request: &FeedRequest) -> Result<FeedPage> {
        let query = feed_query(request);

        let page = self
            .client
            .fetch_with_retry(&query)
            .await
            .map_err(|e| Error::ApiError(e.to_string()))?;

        Ok(FeedPage {
            articles: page.results.into_iter().map(newsdata_to_article).collect(),
            next_page: page.next_page,
        })
    }
}

fn fetch_failed(e: NewsApiError) -> Error {
    Error::FetchFailed(e.to_string())
}

fn feed_query(request: &FeedRequest) -> NewsQuery {
    let mut query = NewsQuery::headlines(&request.language, request.size);
    if let Some(ref q) = request.query {
        query = query.with_query(q.as_str());
    }
    if let Some(ref category) = request.category {
        query = query.with_category(category.as_str());
    }
    if let Some(ref country) = request.country {
        query = query.with_country(country.as_str());
    }
    if let Some(ref page) = request.page {
        query = query.with_page(page.as_str());
    }
    query
}

/// Convert a newsdata.io article to our internal Article model
fn newsdata_to_article(nd: NewsArticle) -> Article {
    let published_at = nd.published_at();
    Article {
        id: ArticleId::new(nd.article_id),
        title: nd.title,
        description: nd.description,
        content: nd.content,
        link: nd.link,
        image_url: nd.image_url,
        published_at,
        // older payloads only carry the id
        source_name: nd.source_name.or(nd.source_id),
        categories: nd.category,
        countries: nd.country,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_query_params() {
        let mut request = FeedRequest::new("en", 10);
        request.category = Some("sports".into());
        request.query = Some("final".into());

        let params = feed_query(&request).to_params();
        assert!(params.contains(&("category", "sports".to_string())));
        assert!(params.contains(&("q", "final".to_string())));
        assert!(params.contains(&("size", "10".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "id"));
    }

    #[test]
    fn test_conversion() {
        let body = r#"{"status":"success","results":[{
            "article_id":"abc","title":"Hello","source_id":"bbc",
            "pubDate":"2024-02-03 04:05:06","category":["top"],"country":["united kingdom"]
        }]}"#;
        let page = newsdeck_api::newsdata::parse_response(body).unwrap();
        let article = newsdata_to_article(page.results.into_iter().next().unwrap());

        assert_eq!(article.id.as_str(), "abc");
        assert_eq!(article.source_name.as_deref(), Some("bbc"));
        assert_eq!(article.categories, vec!["top"]);
        assert!(article.published_at.is_some());
    }
}
