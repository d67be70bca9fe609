use std::sync::Arc;

use league_core::{SeasonId, SeasonWindow};

use crate::{
    domain::{RepoError, RepoRetrieveError},
    ports::store::{RecordMap, Store, StoreKey},
};

#[async_trait::async_trait]
pub trait SeasonRepository {
    async fn list_seasons(&self) -> Result<Vec<SeasonWindow>, RepoError>;
    async fn get_season(&self, season_id: &SeasonId) -> Result<SeasonWindow, RepoRetrieveError>;
    async fn save_season(&self, season: SeasonWindow) -> Result<(), RepoError>;
}

pub struct StoreSeasonRepository<S: Store> {
    store: Arc<S>,
}

impl<S: Store> StoreSeasonRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn parse(id: String, mut value: serde_json::Value) -> Result<SeasonWindow, String> {
        if let serde_json::Value::Object(object) = &mut value {
            object
                .entry("id")
                .or_insert_with(|| serde_json::Value::String(id.clone()));
        }
        serde_json::from_value(value).map_err(|e| format!("season {} is malformed: {}", id, e))
    }

    async fn read_all(&self) -> Result<RecordMap, RepoError> {
        match self.store.read(StoreKey::Seasons).await {
            Ok(records) => Ok(records),
            Err(RepoRetrieveError::NotFound) => Ok(RecordMap::new()),
            Err(RepoRetrieveError::StorageError(e)) => Err(RepoError::StorageError(e)),
        }
    }
}

#[async_trait::async_trait]
impl<S: Store + Send + Sync + 'static> SeasonRepository for StoreSeasonRepository<S> {
    async fn list_seasons(&self) -> Result<Vec<SeasonWindow>, RepoError> {
        self.read_all()
            .await?
            .into_iter()
            .map(|(id, value)| Self::parse(id, value).map_err(RepoError::StorageError))
            .collect()
    }

    async fn get_season(&self, season_id: &SeasonId) -> Result<SeasonWindow, RepoRetrieveError> {
        let mut records = self.read_all().await.map_err(|e| match e {
            RepoError::StorageError(e) => RepoRetrieveError::StorageError(e),
        })?;
        let value = records
            .remove(&season_id.0)
            .ok_or(RepoRetrieveError::NotFound)?;
        Self::parse(season_id.0.clone(), value).map_err(RepoRetrieveError::StorageError)
    }

    async fn save_season(&self, season: SeasonWindow) -> Result<(), RepoError> {
        let key = season.id.0.clone();
        let value =
            serde_json::to_value(&season).map_err(|e| RepoError::StorageError(e.to_string()))?;
        self.store
            .update(StoreKey::Seasons, move |records| {
                records.insert(key, value);
            })
            .await
    }
}
