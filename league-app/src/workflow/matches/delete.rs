use std::sync::Arc;

use league_core::MatchId;

use crate::{domain::matches::MatchRepository, services::league_state::LeagueStateService};

#[async_trait::async_trait]
pub trait DeleteMatchUseCase {
    /// Returns whether the match existed.
    async fn delete_match(&self, match_id: &MatchId) -> Result<bool, DeleteMatchError>;
}

#[derive(Debug)]
pub enum DeleteMatchError {
    Internal,
}

pub struct DeleteMatchUseCaseImpl<M: MatchRepository, L: LeagueStateService> {
    match_repository: Arc<M>,
    league_state_service: Arc<L>,
}

impl<M: MatchRepository, L: LeagueStateService> DeleteMatchUseCaseImpl<M, L> {
    pub fn new(match_repository: Arc<M>, league_state_service: Arc<L>) -> Self {
        Self {
            match_repository,
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<M, L> DeleteMatchUseCase for DeleteMatchUseCaseImpl<M, L>
where
    M: MatchRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn delete_match(&self, match_id: &MatchId) -> Result<bool, DeleteMatchError> {
        let removed = self.match_repository.delete(match_id).await.map_err(|e| {
            log::error!("Failed to delete match {}: {}", match_id, e);
            DeleteMatchError::Internal
        })?;
        if removed {
            self.league_state_service.invalidate();
            log::info!("Deleted match {}", match_id);
        }
        Ok(removed)
    }
}
