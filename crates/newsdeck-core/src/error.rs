use thiserror::Error;

/// All the ways things can go wrong in NewsDeck
///
/// Storage problems are reported but never fatal; the bookmark store keeps
/// working from memory when the disk lets it down.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to fetch articles: {0}")]
    FetchFailed(String),

    #[error("Failed to read stored data: {0}")]
    StorageRead(String),

    #[error("Failed to persist data: {0}")]
    StorageWrite(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Errors the caller can show and carry on from
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::StorageRead(_) | Error::StorageWrite(_))
    }
}
