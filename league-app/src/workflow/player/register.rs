use std::sync::Arc;

use chrono::Utc;
use league_core::{PlayerId, PlayerProfile};

use crate::{
    domain::players::PlayerMetadataRepository, services::league_state::LeagueStateService,
};

#[async_trait::async_trait]
pub trait RegisterPlayerUseCase {
    async fn register_player(
        &self,
        player_id: PlayerId,
        name: String,
        nickname: Option<String>,
    ) -> Result<PlayerProfile, RegisterPlayerError>;
}

#[derive(Debug)]
pub enum RegisterPlayerError {
    PlayerExists,
    InvalidName,
    Internal,
}

pub struct RegisterPlayerUseCaseImpl<P: PlayerMetadataRepository, L: LeagueStateService> {
    player_repository: Arc<P>,
    league_state_service: Arc<L>,
}

impl<P: PlayerMetadataRepository, L: LeagueStateService> RegisterPlayerUseCaseImpl<P, L> {
    pub fn new(player_repository: Arc<P>, league_state_service: Arc<L>) -> Self {
        Self {
            player_repository,
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<P, L> RegisterPlayerUseCase for RegisterPlayerUseCaseImpl<P, L>
where
    P: PlayerMetadataRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn register_player(
        &self,
        player_id: PlayerId,
        name: String,
        nickname: Option<String>,
    ) -> Result<PlayerProfile, RegisterPlayerError> {
        let name = name.trim().to_string();
        if player_id.0.trim().is_empty() || name.is_empty() {
            return Err(RegisterPlayerError::InvalidName);
        }
        let directory = match self.league_state_service.player_directory().await {
            Ok(directory) => directory,
            Err(e) => {
                log::error!("Failed to load player metadata: {}", e);
                return Err(RegisterPlayerError::Internal);
            }
        };
        if directory.contains(&player_id) {
            return Err(RegisterPlayerError::PlayerExists);
        }

        let profile = PlayerProfile {
            name,
            nickname: nickname.filter(|n| !n.trim().is_empty()),
            avatar: None,
            created_at: Some(Utc::now()),
        };
        if let Err(e) = self
            .player_repository
            .save_profile(&player_id, profile.clone())
            .await
        {
            log::error!("Failed to save player {}: {}", player_id, e);
            return Err(RegisterPlayerError::Internal);
        }
        self.league_state_service.invalidate();
        log::info!("Registered player {}", player_id);
        Ok(profile)
    }
}
