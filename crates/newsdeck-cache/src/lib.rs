// Device-local key-value storage
// Bookmarks and preferences live here, nothing is keyed per user

pub mod store;

pub use store::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
