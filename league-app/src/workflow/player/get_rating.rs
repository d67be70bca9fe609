use std::sync::Arc;

use league_core::{BASELINE_RATING, PlayerId};

use crate::services::league_state::LeagueStateService;

#[async_trait::async_trait]
pub trait GetPlayerRatingUseCase {
    async fn get_rating(&self, player_id: &PlayerId) -> Result<i32, GetPlayerRatingError>;
}

#[derive(Debug)]
pub enum GetPlayerRatingError {
    Internal,
}

pub struct GetPlayerRatingUseCaseImpl<L: LeagueStateService> {
    league_state_service: Arc<L>,
}

impl<L: LeagueStateService> GetPlayerRatingUseCaseImpl<L> {
    pub fn new(league_state_service: Arc<L>) -> Self {
        Self {
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<L: LeagueStateService + Send + Sync + 'static> GetPlayerRatingUseCase
    for GetPlayerRatingUseCaseImpl<L>
{
    async fn get_rating(&self, player_id: &PlayerId) -> Result<i32, GetPlayerRatingError> {
        match self.league_state_service.player_states().await {
            Ok(states) => Ok(states
                .get(player_id)
                .map(|state| state.current_rating)
                .unwrap_or(BASELINE_RATING)),
            Err(e) => {
                log::error!("Failed to derive rating for player {}: {}", player_id, e);
                Err(GetPlayerRatingError::Internal)
            }
        }
    }
}
