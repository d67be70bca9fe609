use std::sync::Arc;

use crate::services::{derivation_cache::PlayerStates, league_state::LeagueStateService};

#[async_trait::async_trait]
pub trait ListPlayerStatesUseCase {
    async fn list_states(&self) -> Result<Arc<PlayerStates>, ListPlayerStatesError>;
}

#[derive(Debug)]
pub enum ListPlayerStatesError {
    Internal,
}

pub struct ListPlayerStatesUseCaseImpl<L: LeagueStateService> {
    league_state_service: Arc<L>,
}

impl<L: LeagueStateService> ListPlayerStatesUseCaseImpl<L> {
    pub fn new(league_state_service: Arc<L>) -> Self {
        Self {
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<L: LeagueStateService + Send + Sync + 'static> ListPlayerStatesUseCase
    for ListPlayerStatesUseCaseImpl<L>
{
    async fn list_states(&self) -> Result<Arc<PlayerStates>, ListPlayerStatesError> {
        self.league_state_service
            .player_states()
            .await
            .map_err(|e| {
                log::error!("Failed to derive player states: {}", e);
                ListPlayerStatesError::Internal
            })
    }
}
