// Core logic: bookmarks, hydration of saved articles, feeds and filters
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod feeds;
pub mod filters;
pub mod hydrator;
pub mod models;
pub mod preferences;
pub mod providers;
pub mod saved;
pub mod session;
pub mod source;

pub use bookmarks::{BookmarkSet, BookmarkStore, BookmarkUpdate, BOOKMARK_KEY};
pub use config::Config;
pub use error::Error;
pub use feeds::NewsFeed;
pub use filters::{FilterOption, FilterSet};
pub use hydrator::ArticleHydrator;
pub use models::{Article, ArticleId};
pub use preferences::{Preferences, DARK_MODE_KEY};
pub use saved::{LoadState, LoadTicket, SavedArticles};
pub use session::{Session, Theme, UserProfile};
pub use source::{ArticleSource, FeedPage, FeedRequest};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
