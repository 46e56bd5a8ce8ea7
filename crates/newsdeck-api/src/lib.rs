// API client for the newsdata.io news service
pub mod newsdata;
pub mod retry;

// Re-export common types
pub use newsdata::{NewsApiError, NewsArticle, NewsDataClient, NewsPage, NewsQuery, NEWSDATA_API_BASE};
pub use retry::RetryConfig;
