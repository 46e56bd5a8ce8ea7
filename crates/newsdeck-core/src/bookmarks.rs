use crate::{models::ArticleId, Error};
use newsdeck_cache::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Storage key the saved-article ids live under
pub const BOOKMARK_KEY: &str = "bookmark";

/// Ordered, duplicate-free list of saved article ids.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkSet {
    ids: Vec<ArticleId>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ArticleId) -> bool {
        self.ids.contains(id)
    }

    /// Append unless already present. Returns whether anything changed.
    pub fn insert(&mut self, id: ArticleId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns whether anything changed
    pub fn remove(&mut self, id: &ArticleId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[ArticleId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored array. Duplicates written by older builds collapse
    /// onto their first occurrence.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        let ids: Vec<ArticleId> = serde_json::from_str(raw)?;
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        Ok(set)
    }
}

impl FromIterator<ArticleId> for BookmarkSet {
    fn from_iter<I: IntoIterator<Item = ArticleId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Result of a bookmark mutation.
///
/// `warning` is set when the change could not be written to storage. The
/// change still holds in memory for this session.
#[derive(Debug)]
pub struct BookmarkUpdate {
    pub changed: bool,
    pub warning: Option<Error>,
}

impl BookmarkUpdate {
    pub fn persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Device-local bookmark storage.
///
/// The set is read from storage once and mirrored in memory; every mutation
/// runs read-modify-persist under one lock so two toggles never interleave.
/// Bookmarks are not keyed per user.
pub struct BookmarkStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    current: Mutex<Option<BookmarkSet>>,
}

impl BookmarkStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, BOOKMARK_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            current: Mutex::new(None),
        }
    }

    pub fn is_bookmarked(&self, id: &ArticleId) -> bool {
        let mut guard = self.lock();
        self.loaded(&mut guard)
            .map(|set| set.contains(id))
            .unwrap_or(false)
    }

    /// Current ids in insertion order; empty when nothing is saved or
    /// storage can't be read right now
    pub fn list(&self) -> Vec<ArticleId> {
        let mut guard = self.lock();
        self.loaded(&mut guard)
            .map(|set| set.ids().to_vec())
            .unwrap_or_default()
    }

    pub fn add(&self, id: ArticleId) -> BookmarkUpdate {
        self.mutate(|set| set.insert(id))
    }

    pub fn remove(&self, id: &ArticleId) -> BookmarkUpdate {
        self.mutate(|set| set.remove(id))
    }

    /// Flip membership. `changed` is true unless the saved set couldn't be
    /// read; check `is_bookmarked` afterwards for the new state.
    pub fn toggle(&self, id: ArticleId) -> BookmarkUpdate {
        self.mutate(|set| {
            if !set.remove(&id) {
                set.insert(id);
            }
            true
        })
    }

    /// Drop every bookmark
    pub fn clear(&self) -> BookmarkUpdate {
        self.mutate(|set| {
            let had_any = !set.is_empty();
            *set = BookmarkSet::new();
            had_any
        })
    }

    fn mutate<F>(&self, op: F) -> BookmarkUpdate
    where
        F: FnOnce(&mut BookmarkSet) -> bool,
    {
        let mut guard = self.lock();
        let set = match self.loaded(&mut guard) {
            Ok(set) => set,
            Err(err) => {
                warn!("Bookmark change dropped: {}", err);
                return BookmarkUpdate {
                    changed: false,
                    warning: Some(err),
                };
            }
        };

        let changed = op(&mut *set);
        if !changed {
            return BookmarkUpdate {
                changed,
                warning: None,
            };
        }

        let warning = self.persist(set).err();
        if let Some(ref err) = warning {
            warn!("Bookmark change kept in memory only: {}", err);
        }

        BookmarkUpdate { changed, warning }
    }

    fn lock(&self) -> MutexGuard<'_, Option<BookmarkSet>> {
        // the set is still well-formed after a panic mid-mutation
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cached set, reading storage on first use. A failed read is not
    /// cached, so the next call tries storage again.
    fn loaded<'a>(
        &self,
        slot: &'a mut Option<BookmarkSet>,
    ) -> crate::Result<&'a mut BookmarkSet> {
        if slot.is_none() {
            *slot = Some(self.load()?);
        }
        Ok(slot.get_or_insert_with(BookmarkSet::new))
    }

    /// Read the persisted set. Missing or corrupt data counts as empty and
    /// gets overwritten by the next successful write; a storage error is
    /// returned as `StorageRead`.
    fn load(&self) -> crate::Result<BookmarkSet> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No bookmarks stored yet");
                return Ok(BookmarkSet::new());
            }
            Err(e) => {
                let err = Error::StorageRead(e.to_string());
                warn!("Couldn't read bookmarks: {}", err);
                return Err(err);
            }
        };

        match BookmarkSet::from_json(&raw) {
            Ok(set) => {
                debug!("Loaded {} bookmarks", set.len());
                Ok(set)
            }
            Err(e) => {
                let err = Error::StorageRead(format!("corrupt bookmark data: {}", e));
                warn!("{}; starting with no bookmarks", err);
                Ok(BookmarkSet::new())
            }
        }
    }

    fn persist(&self, set: &BookmarkSet) -> crate::Result<()> {
        let raw = set.to_json()?;
        self.storage
            .set(&self.key, &raw)
            .map_err(|e| Error::StorageWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdeck_cache::{MemoryStore, StorageError};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn id(s: &str) -> ArticleId {
        ArticleId::from(s)
    }

    fn ids(list: &[&str]) -> Vec<ArticleId> {
        list.iter().map(|s| id(s)).collect()
    }

    fn memory_store() -> (Arc<MemoryStore>, BookmarkStore) {
        let storage = Arc::new(MemoryStore::new());
        let store = BookmarkStore::new(storage.clone());
        (storage, store)
    }

    /// Storage whose reads and writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> newsdeck_cache::store::Result<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Poisoned);
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> newsdeck_cache::store::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> newsdeck_cache::store::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_add_remove_scenario() {
        let (_, store) = memory_store();

        store.add(id("x"));
        assert_eq!(store.list(), ids(&["x"]));

        let again = store.add(id("x"));
        assert!(!again.changed);
        assert_eq!(store.list(), ids(&["x"]));

        store.add(id("y"));
        assert_eq!(store.list(), ids(&["x", "y"]));

        store.remove(&id("x"));
        assert_eq!(store.list(), ids(&["y"]));
    }

    #[test]
    fn test_list_is_empty_before_first_write() {
        let (_, store) = memory_store();
        assert!(store.list().is_empty());
        assert!(!store.is_bookmarked(&id("anything")));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (storage, store) = memory_store();
        let update = store.remove(&id("ghost"));

        assert!(!update.changed);
        assert!(store.list().is_empty());
        // nothing changed, nothing written
        assert_eq!(storage.get(BOOKMARK_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_is_persisted_immediately() {
        let (storage, store) = memory_store();
        store.add(id("a"));
        store.add(id("b"));

        assert_eq!(
            storage.get(BOOKMARK_KEY).unwrap().as_deref(),
            Some(r#"["a","b"]"#)
        );

        // a fresh store over the same storage sees the same set
        let reopened = BookmarkStore::new(storage);
        assert_eq!(reopened.list(), ids(&["a", "b"]));
    }

    #[test]
    fn test_toggle() {
        let (_, store) = memory_store();

        store.toggle(id("t"));
        assert!(store.is_bookmarked(&id("t")));

        store.toggle(id("t"));
        assert!(!store.is_bookmarked(&id("t")));
    }

    #[test]
    fn test_clear() {
        let (storage, store) = memory_store();
        store.add(id("a"));
        store.add(id("b"));

        assert!(store.clear().changed);
        assert!(store.list().is_empty());
        assert_eq!(storage.get(BOOKMARK_KEY).unwrap().as_deref(), Some("[]"));
        assert!(!store.clear().changed);
    }

    #[test]
    fn test_corrupt_data_reads_as_empty_and_heals() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(BOOKMARK_KEY, "{not json").unwrap();

        let store = BookmarkStore::new(storage.clone());
        assert!(store.list().is_empty());

        store.add(id("fresh"));
        assert_eq!(
            storage.get(BOOKMARK_KEY).unwrap().as_deref(),
            Some(r#"["fresh"]"#)
        );
    }

    #[test]
    fn test_wrong_shape_counts_as_corrupt() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(BOOKMARK_KEY, r#"{"ids": ["a"]}"#).unwrap();

        let store = BookmarkStore::new(storage);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_change_in_memory() {
        let storage = Arc::new(FlakyStore::default());
        let store = BookmarkStore::new(storage.clone());

        store.add(id("a"));
        storage.fail_writes.store(true, Ordering::SeqCst);

        let update = store.add(id("b"));
        assert!(update.changed);
        assert!(!update.persisted());
        assert!(matches!(update.warning, Some(Error::StorageWrite(_))));

        // session view includes the change, disk does not
        assert_eq!(store.list(), ids(&["a", "b"]));
        assert_eq!(
            storage.get(BOOKMARK_KEY).unwrap().as_deref(),
            Some(r#"["a"]"#)
        );
    }

    #[test]
    fn test_read_failure_never_overwrites_saved_bookmarks() {
        let storage = Arc::new(FlakyStore::default());
        storage.inner.set(BOOKMARK_KEY, r#"["a","b"]"#).unwrap();
        storage.fail_reads.store(true, Ordering::SeqCst);

        let store = BookmarkStore::new(storage.clone());
        assert!(store.list().is_empty());
        assert!(!store.is_bookmarked(&id("a")));

        let update = store.add(id("c"));
        assert!(!update.changed);
        assert!(matches!(update.warning, Some(Error::StorageRead(_))));
        assert_eq!(
            storage.inner.get(BOOKMARK_KEY).unwrap().as_deref(),
            Some(r#"["a","b"]"#)
        );

        // storage comes back: nothing was lost and the store picks it up
        storage.fail_reads.store(false, Ordering::SeqCst);
        assert_eq!(store.list(), ids(&["a", "b"]));

        assert!(store.add(id("c")).persisted());
        assert_eq!(
            storage.get(BOOKMARK_KEY).unwrap().as_deref(),
            Some(r#"["a","b","c"]"#)
        );
    }

    #[test]
    fn test_duplicates_in_storage_collapse() {
        let set = BookmarkSet::from_json(r#"["a","b","a"]"#).unwrap();
        assert_eq!(set.ids(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_json_round_trip_sizes() {
        for n in [0usize, 1, 25] {
            let set: BookmarkSet = (0..n).map(|i| id(&format!("article-{}", i))).collect();
            let back = BookmarkSet::from_json(&set.to_json().unwrap()).unwrap();
            assert_eq!(back, set, "round trip failed for {} items", n);
        }
    }

    #[test]
    fn test_operation_sequence_matches_set_model() {
        let (_, store) = memory_store();
        let mut model = BTreeSet::new();

        // deterministic pseudo-random walk over a small id space
        let mut seed: u64 = 0x5eed;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let key = format!("id{}", (seed >> 33) % 7);
            if (seed >> 20) % 3 == 0 {
                store.remove(&id(&key));
                model.remove(&key);
            } else {
                store.add(id(&key));
                model.insert(key);
            }

            let listed: BTreeSet<String> =
                store.list().iter().map(|i| i.as_str().to_string()).collect();
            assert_eq!(listed, model);
            assert_eq!(store.list().len(), model.len(), "duplicates crept in");
        }
    }
}
