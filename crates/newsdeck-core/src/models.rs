use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier the news service hands out per article. Opaque to us.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ArticleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A news article as the app shows it. Read-only once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: Option<String>,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
}

impl Article {
    /// Bare article, mostly useful for tests and fakes
    pub fn new(id: impl Into<ArticleId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            content: None,
            link: None,
            image_url: None,
            published_at: None,
            source_name: None,
            categories: Vec::new(),
            countries: Vec::new(),
        }
    }

    /// Text for the detail view: description if there is one, else the content
    pub fn body(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.content.as_deref())
    }

    /// "May 01, 09.30 am" style timestamp used in list rows
    pub fn published_label(&self) -> Option<String> {
        self.published_at
            .map(|ts| ts.format("%B %d, %I.%M %P").to_string())
    }
}
