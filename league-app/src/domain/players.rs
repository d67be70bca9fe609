use std::sync::Arc;

use league_core::{LeagueError, PlayerDirectory, PlayerId, PlayerProfile};

use crate::{
    domain::{DerivationError, RepoError, RepoRetrieveError},
    ports::store::{Store, StoreKey},
};

#[async_trait::async_trait]
pub trait PlayerMetadataRepository {
    async fn load_directory(&self) -> Result<PlayerDirectory, DerivationError>;
    async fn save_profile(
        &self,
        player_id: &PlayerId,
        profile: PlayerProfile,
    ) -> Result<(), RepoError>;
}

pub struct StorePlayerMetadataRepository<S: Store> {
    store: Arc<S>,
}

impl<S: Store> StorePlayerMetadataRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl<S: Store + Send + Sync + 'static> PlayerMetadataRepository
    for StorePlayerMetadataRepository<S>
{
    async fn load_directory(&self) -> Result<PlayerDirectory, DerivationError> {
        let records = match self.store.read(StoreKey::PlayerMetadata).await {
            Ok(records) => records,
            Err(RepoRetrieveError::NotFound) => return Ok(PlayerDirectory::new()),
            Err(e) => return Err(e.into()),
        };
        records
            .into_iter()
            .map(
                |(id, value)| match serde_json::from_value::<PlayerProfile>(value) {
                    Ok(profile) => Ok((PlayerId(id), profile)),
                    Err(e) => Err(DerivationError::from(LeagueError::malformed(id, e.to_string()))),
                },
            )
            .collect()
    }

    async fn save_profile(
        &self,
        player_id: &PlayerId,
        profile: PlayerProfile,
    ) -> Result<(), RepoError> {
        let key = player_id.0.clone();
        let value =
            serde_json::to_value(&profile).map_err(|e| RepoError::StorageError(e.to_string()))?;
        self.store
            .update(StoreKey::PlayerMetadata, move |records| {
                records.insert(key, value);
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ports::store::{InMemoryStore, RecordMap};

    #[tokio::test]
    async fn test_load_directory() {
        let mut records = RecordMap::new();
        records.insert(
            "p1".to_string(),
            json!({"name": "Anna", "nickname": "Flitzer", "avatar": null, "createdAt": 1735689600}),
        );
        records.insert("p2".to_string(), json!({"name": "Ben"}));
        let store = InMemoryStore::new().with_collection(StoreKey::PlayerMetadata, records);
        let repo = StorePlayerMetadataRepository::new(Arc::new(store));

        let directory = repo.load_directory().await.unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.display_name_of(&PlayerId::from("p1")), "Flitzer");
        assert_eq!(directory.name_of(&PlayerId::from("p2")), "Ben");
    }

    #[tokio::test]
    async fn test_save_profile_round_trips() {
        let repo = StorePlayerMetadataRepository::new(Arc::new(InMemoryStore::new()));
        assert!(repo.load_directory().await.unwrap().is_empty());
        repo.save_profile(&PlayerId::from("p1"), PlayerProfile::new("Anna"))
            .await
            .unwrap();
        let directory = repo.load_directory().await.unwrap();
        assert!(directory.contains(&PlayerId::from("p1")));
    }

    #[tokio::test]
    async fn test_profile_without_name_is_malformed() {
        let mut records = RecordMap::new();
        records.insert("p1".to_string(), json!({"nickname": "x"}));
        let store = InMemoryStore::new().with_collection(StoreKey::PlayerMetadata, records);
        let repo = StorePlayerMetadataRepository::new(Arc::new(store));
        assert!(matches!(
            repo.load_directory().await,
            Err(DerivationError::MalformedRecord(_))
        ));
    }
}
