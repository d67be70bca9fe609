use std::sync::Arc;

use league_core::{MatchId, MatchLog, MatchRecord};

use crate::{
    domain::{DerivationError, RepoError, RepoRetrieveError},
    ports::store::{Store, StoreKey},
};

#[async_trait::async_trait]
pub trait MatchRepository {
    /// Reads and validates the whole log. A log that was never written is
    /// empty.
    async fn load_log(&self) -> Result<MatchLog, DerivationError>;
    async fn append(&self, record: MatchRecord) -> Result<(), RepoError>;
    /// Returns whether a record was removed.
    async fn delete(&self, match_id: &MatchId) -> Result<bool, RepoError>;
}

pub struct StoreMatchRepository<S: Store> {
    store: Arc<S>,
}

impl<S: Store> StoreMatchRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl<S: Store + Send + Sync + 'static> MatchRepository for StoreMatchRepository<S> {
    async fn load_log(&self) -> Result<MatchLog, DerivationError> {
        match self.store.read(StoreKey::Matches).await {
            Ok(records) => {
                let match_log = MatchLog::from_raw(records)?;
                log::debug!("Loaded {} matches", match_log.len());
                Ok(match_log)
            }
            Err(RepoRetrieveError::NotFound) => Ok(MatchLog::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn append(&self, record: MatchRecord) -> Result<(), RepoError> {
        let key = record.id.0.clone();
        let value =
            serde_json::to_value(&record).map_err(|e| RepoError::StorageError(e.to_string()))?;
        self.store
            .update(StoreKey::Matches, move |records| {
                records.insert(key, value);
            })
            .await
    }

    async fn delete(&self, match_id: &MatchId) -> Result<bool, RepoError> {
        let key = match_id.0.clone();
        self.store
            .update(StoreKey::Matches, move |records| records.remove(&key).is_some())
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use league_core::{LeagueError, PlayerId};
    use serde_json::json;

    use super::*;
    use crate::ports::store::{InMemoryStore, RecordMap};

    fn record(id: &str) -> MatchRecord {
        MatchRecord::new(
            MatchId::from(id),
            PlayerId::from("anna"),
            PlayerId::from("ben"),
            6,
            4,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_log() {
        let repo = StoreMatchRepository::new(Arc::new(InMemoryStore::new()));
        assert!(repo.load_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_delete() {
        let repo = StoreMatchRepository::new(Arc::new(InMemoryStore::new()));
        repo.append(record("m1")).await.unwrap();
        repo.append(record("m2")).await.unwrap();
        assert_eq!(repo.load_log().await.unwrap().len(), 2);

        assert!(repo.delete(&MatchId::from("m1")).await.unwrap());
        assert!(!repo.delete(&MatchId::from("m1")).await.unwrap());
        let log = repo.load_log().await.unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.get(&MatchId::from("m2")).is_some());
    }

    #[tokio::test]
    async fn test_malformed_record_fails_load() {
        let mut records = RecordMap::new();
        records.insert(
            "m1".to_string(),
            json!({
                "player1Id": "anna",
                "player2Id": "anna",
                "scorePlayer1": 1,
                "scorePlayer2": 0,
                "playedAt": 1740000000
            }),
        );
        let store = InMemoryStore::new().with_collection(StoreKey::Matches, records);
        let repo = StoreMatchRepository::new(Arc::new(store));
        assert!(matches!(
            repo.load_log().await,
            Err(DerivationError::MalformedRecord(LeagueError::MalformedRecord { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_store_propagates() {
        let store = Arc::new(InMemoryStore::new());
        store.set_unavailable(true);
        let repo = StoreMatchRepository::new(store);
        assert!(matches!(
            repo.load_log().await,
            Err(DerivationError::StoreUnavailable(_))
        ));
    }
}
