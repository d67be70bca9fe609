use std::sync::Arc;

use league_core::{DerivedPlayerState, PlayerId};

use crate::services::league_state::LeagueStateService;

#[async_trait::async_trait]
pub trait GetPlayerStateUseCase {
    async fn get_state(&self, player_id: &PlayerId)
    -> Result<DerivedPlayerState, GetPlayerStateError>;
}

#[derive(Debug)]
pub enum GetPlayerStateError {
    PlayerNotFound,
    Internal,
}

pub struct GetPlayerStateUseCaseImpl<L: LeagueStateService> {
    league_state_service: Arc<L>,
}

impl<L: LeagueStateService> GetPlayerStateUseCaseImpl<L> {
    pub fn new(league_state_service: Arc<L>) -> Self {
        Self {
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<L: LeagueStateService + Send + Sync + 'static> GetPlayerStateUseCase
    for GetPlayerStateUseCaseImpl<L>
{
    async fn get_state(
        &self,
        player_id: &PlayerId,
    ) -> Result<DerivedPlayerState, GetPlayerStateError> {
        let states = match self.league_state_service.player_states().await {
            Ok(states) => states,
            Err(e) => {
                log::error!("Failed to derive state for player {}: {}", player_id, e);
                return Err(GetPlayerStateError::Internal);
            }
        };
        states
            .get(player_id)
            .cloned()
            .ok_or(GetPlayerStateError::PlayerNotFound)
    }
}
