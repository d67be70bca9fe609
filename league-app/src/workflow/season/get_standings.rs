use std::sync::Arc;

use league_core::{SeasonId, StandingsRow};

use crate::{
    domain::seasons::SeasonRepository,
    services::league_state::LeagueStateService,
    workflow::season::{SeasonLookupError, find_season},
};

#[async_trait::async_trait]
pub trait GetStandingsUseCase {
    async fn get_standings(
        &self,
        season_id: &SeasonId,
    ) -> Result<Arc<Vec<StandingsRow>>, SeasonLookupError>;
}

pub struct GetStandingsUseCaseImpl<S: SeasonRepository, L: LeagueStateService> {
    season_repository: Arc<S>,
    league_state_service: Arc<L>,
}

impl<S: SeasonRepository, L: LeagueStateService> GetStandingsUseCaseImpl<S, L> {
    pub fn new(season_repository: Arc<S>, league_state_service: Arc<L>) -> Self {
        Self {
            season_repository,
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<S, L> GetStandingsUseCase for GetStandingsUseCaseImpl<S, L>
where
    S: SeasonRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn get_standings(
        &self,
        season_id: &SeasonId,
    ) -> Result<Arc<Vec<StandingsRow>>, SeasonLookupError> {
        let season = find_season(&*self.season_repository, season_id).await?;
        self.league_state_service
            .standings(&season)
            .await
            .map_err(|e| {
                log::error!("Failed to derive standings for season {}: {}", season_id, e);
                SeasonLookupError::Internal
            })
    }
}
