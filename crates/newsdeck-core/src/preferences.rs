use crate::{session::Theme, Error, Result};
use newsdeck_cache::KeyValueStore;
use std::sync::Arc;
use tracing::warn;

pub const DARK_MODE_KEY: &str = "@dark_mode";

/// Device-level UI preferences kept next to the bookmarks
pub struct Preferences {
    storage: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Stored dark-mode flag. Missing or unreadable means light mode.
    pub fn dark_mode(&self) -> bool {
        match self.storage.get(DARK_MODE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable dark mode preference: {}", e);
                false
            }),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read dark mode preference: {}", e);
                false
            }
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::from_dark_mode(self.dark_mode())
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        let raw = serde_json::to_string(&enabled)?;
        self.storage
            .set(DARK_MODE_KEY, &raw)
            .map_err(|e| Error::StorageWrite(e.to_string()))
    }

    /// Flip and persist; returns the new value
    pub fn toggle_dark_mode(&self) -> Result<bool> {
        let next = !self.dark_mode();
        self.set_dark_mode(next)?;
        Ok(next)
    }
}
