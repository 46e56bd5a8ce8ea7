// Turns saved ids back into full articles
use crate::{
    models::{Article, ArticleId},
    source::ArticleSource,
    Error, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolves bookmarked ids into articles with one batched request
pub struct ArticleHydrator {
    source: Arc<dyn ArticleSource>,
}

impl ArticleHydrator {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self { source }
    }

    /// Fetch the articles behind `ids`.
    ///
    /// No ids means no request. Ids the service no longer serves are dropped
    /// without complaint. The result follows bookmark order and never holds
    /// the same article twice. Any source failure becomes `FetchFailed`.
    pub async fn hydrate(&self, ids: &[ArticleId]) -> Result<Vec<Article>> {
        if ids.is_empty() {
            debug!("Nothing bookmarked, skipping fetch");
            return Ok(Vec::new());
        }

        let fetched = self.source.fetch_by_ids(ids).await.map_err(|e| match e {
            Error::FetchFailed(_) => e,
            other => Error::FetchFailed(other.to_string()),
        })?;

        let articles = reconcile(ids, fetched);
        if articles.len() < ids.len() {
            info!(
                "Hydrated {} of {} bookmarks; the rest are gone from the service",
                articles.len(),
                ids.len()
            );
        } else {
            info!("Hydrated {} bookmarks", articles.len());
        }

        Ok(articles)
    }
}

/// Order fetched articles by bookmark position, dropping strays and repeats
fn reconcile(ids: &[ArticleId], fetched: Vec<Article>) -> Vec<Article> {
    let mut by_id: HashMap<ArticleId, Article> = HashMap::with_capacity(fetched.len());
    for article in fetched {
        if !ids.contains(&article.id) {
            warn!("Service returned unrequested article {}", article.id);
            continue;
        }
        by_id.entry(article.id.clone()).or_insert(article);
    }

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
