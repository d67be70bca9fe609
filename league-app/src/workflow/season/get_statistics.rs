use std::sync::Arc;

use league_core::{SeasonId, SeasonStatistics};

use crate::{
    domain::seasons::SeasonRepository,
    services::league_state::LeagueStateService,
    workflow::season::{SeasonLookupError, find_season},
};

#[async_trait::async_trait]
pub trait GetSeasonStatisticsUseCase {
    async fn get_statistics(
        &self,
        season_id: &SeasonId,
    ) -> Result<Arc<SeasonStatistics>, SeasonLookupError>;
}

pub struct GetSeasonStatisticsUseCaseImpl<S: SeasonRepository, L: LeagueStateService> {
    season_repository: Arc<S>,
    league_state_service: Arc<L>,
}

impl<S: SeasonRepository, L: LeagueStateService> GetSeasonStatisticsUseCaseImpl<S, L> {
    pub fn new(season_repository: Arc<S>, league_state_service: Arc<L>) -> Self {
        Self {
            season_repository,
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<S, L> GetSeasonStatisticsUseCase for GetSeasonStatisticsUseCaseImpl<S, L>
where
    S: SeasonRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn get_statistics(
        &self,
        season_id: &SeasonId,
    ) -> Result<Arc<SeasonStatistics>, SeasonLookupError> {
        let season = find_season(&*self.season_repository, season_id).await?;
        self.league_state_service
            .season_statistics(&season)
            .await
            .map_err(|e| {
                log::error!("Failed to derive statistics for season {}: {}", season_id, e);
                SeasonLookupError::Internal
            })
    }
}
