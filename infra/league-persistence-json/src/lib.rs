use std::path::{Path, PathBuf};

use league_app::{
    domain::{RepoError, RepoRetrieveError},
    ports::store::{RecordMap, Store, StoreKey},
};
use tokio::sync::Mutex;

/// Keeps each collection as `<key>.json` in one directory.
///
/// Writes go to a temporary file that is renamed over the target, and the
/// previous version is kept as `<key>.json.bak`.
pub struct JsonFileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }

    fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Object keyed by record id. An array is the older layout: records
    /// carry their own `id`, and an empty array is an empty collection.
    fn parse(key: StoreKey, contents: &str) -> Result<RecordMap, String> {
        if contents.trim().is_empty() {
            return Ok(RecordMap::new());
        }
        let value: serde_json::Value = serde_json::from_str(contents)
            .map_err(|e| format!("{} is not valid JSON: {}", key, e))?;
        match value {
            serde_json::Value::Object(object) => Ok(object.into_iter().collect()),
            serde_json::Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item.get("id").and_then(|id| id.as_str()) {
                    Some(id) => Ok((id.to_string(), item)),
                    None => Err(format!("{} entry {} has no id", key, index)),
                })
                .collect(),
            _ => Err(format!("{} must hold an object of records", key)),
        }
    }

    async fn load(&self, key: StoreKey) -> Result<Option<RecordMap>, String> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Self::parse(key, &contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(format!("failed to read {}: {}", path.display(), e)),
        }
    }

    /// Caller must hold `write_lock`.
    async fn persist(&self, key: StoreKey, records: &RecordMap) -> Result<(), String> {
        let path = self.path_for(key);
        let contents = serde_json::to_string_pretty(records)
            .map_err(|e| format!("failed to encode {}: {}", key, e))?;

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| format!("failed to create {}: {}", self.data_dir.display(), e))?;

        let tmp_path = Self::with_suffix(&path, ".tmp");
        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| format!("failed to write {}: {}", tmp_path.display(), e))?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let backup_path = Self::with_suffix(&path, ".bak");
            if let Err(e) = tokio::fs::copy(&path, &backup_path).await {
                log::warn!("Failed to back up {}: {}", path.display(), e);
            }
        }

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| format!("failed to replace {}: {}", path.display(), e))?;
        log::debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for JsonFileStore {
    async fn read(&self, key: StoreKey) -> Result<RecordMap, RepoRetrieveError> {
        match self.load(key).await {
            Ok(Some(records)) => Ok(records),
            Ok(None) => Err(RepoRetrieveError::NotFound),
            Err(e) => {
                log::error!("{}", e);
                Err(RepoRetrieveError::StorageError(e))
            }
        }
    }

    async fn write(&self, key: StoreKey, records: RecordMap) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        self.persist(key, &records)
            .await
            .map_err(RepoError::StorageError)
    }

    async fn update<R: Send + 'static>(
        &self,
        key: StoreKey,
        update_fn: impl for<'a> FnOnce(&'a mut RecordMap) -> R + Send + 'static,
    ) -> Result<R, RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self
            .load(key)
            .await
            .map_err(RepoError::StorageError)?
            .unwrap_or_default();
        let result = update_fn(&mut records);
        self.persist(key, &records)
            .await
            .map_err(RepoError::StorageError)?;
        Ok(result)
    }
}
