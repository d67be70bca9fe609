use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use crate::domain::{RepoError, RepoRetrieveError};

/// Collections kept by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Matches,
    PlayerMetadata,
    Seasons,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Matches => "matches",
            StoreKey::PlayerMetadata => "players_meta",
            StoreKey::Seasons => "seasons",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Records of one collection keyed by their id.
pub type RecordMap = BTreeMap<String, serde_json::Value>;

#[async_trait::async_trait]
pub trait Store {
    /// `NotFound` means the collection was never written.
    async fn read(&self, key: StoreKey) -> Result<RecordMap, RepoRetrieveError>;

    async fn write(&self, key: StoreKey, records: RecordMap) -> Result<(), RepoError>;

    /// Read-modify-write under the store's exclusive write lock. A missing
    /// collection starts empty.
    async fn update<R: Send + 'static>(
        &self,
        key: StoreKey,
        update_fn: impl for<'a> FnOnce(&'a mut RecordMap) -> R + Send + 'static,
    ) -> Result<R, RepoError>;
}

/// Store kept in memory, used by tests and dry runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<Mutex<HashMap<StoreKey, RecordMap>>>,
    reads: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, key: StoreKey, records: RecordMap) -> Self {
        self.collections.lock().insert(key, records);
        self
    }

    /// Number of `read` calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Makes every following call fail with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn snapshot(&self, key: StoreKey) -> Option<RecordMap> {
        self.collections.lock().get(&key).cloned()
    }

    fn check_available(&self) -> Result<(), String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err("in-memory store marked unavailable".to_string());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn read(&self, key: StoreKey) -> Result<RecordMap, RepoRetrieveError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()
            .map_err(RepoRetrieveError::StorageError)?;
        self.collections
            .lock()
            .get(&key)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn write(&self, key: StoreKey, records: RecordMap) -> Result<(), RepoError> {
        self.check_available().map_err(RepoError::StorageError)?;
        self.collections.lock().insert(key, records);
        Ok(())
    }

    async fn update<R: Send + 'static>(
        &self,
        key: StoreKey,
        update_fn: impl for<'a> FnOnce(&'a mut RecordMap) -> R + Send + 'static,
    ) -> Result<R, RepoError> {
        self.check_available().map_err(RepoError::StorageError)?;
        let mut collections = self.collections.lock();
        Ok(update_fn(collections.entry(key).or_default()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_missing_collection_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.read(StoreKey::Matches).await,
            Err(RepoRetrieveError::NotFound)
        ));
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_update_creates_collection() {
        let store = InMemoryStore::new();
        let len = store
            .update(StoreKey::Seasons, |records| {
                records.insert("s1".to_string(), json!({"name": "Mai"}));
                records.len()
            })
            .await
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.read(StoreKey::Seasons).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.read(StoreKey::Matches).await,
            Err(RepoRetrieveError::StorageError(_))
        ));
        assert!(store.write(StoreKey::Matches, RecordMap::new()).await.is_err());
    }
}
