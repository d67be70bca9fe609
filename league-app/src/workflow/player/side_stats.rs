use std::sync::Arc;

use league_core::{GlobalSideStatistics, MatchLog, PlayerDirectory, PlayerId, SideStatistics};

use crate::{
    domain::DerivationError, services::league_state::LeagueStateService,
    workflow::player::PlayerSideView,
};

#[async_trait::async_trait]
pub trait SideStatisticsUseCase {
    async fn player_side_statistics(
        &self,
        player_id: &PlayerId,
    ) -> Result<PlayerSideView, SideStatisticsError>;
    async fn global_side_statistics(&self) -> Result<GlobalSideStatistics, SideStatisticsError>;
}

#[derive(Debug)]
pub enum SideStatisticsError {
    PlayerNotFound,
    Internal,
}

pub struct SideStatisticsUseCaseImpl<L: LeagueStateService> {
    league_state_service: Arc<L>,
}

impl<L: LeagueStateService> SideStatisticsUseCaseImpl<L> {
    pub fn new(league_state_service: Arc<L>) -> Self {
        Self {
            league_state_service,
        }
    }

    async fn load(&self) -> Result<(Arc<MatchLog>, Arc<PlayerDirectory>), DerivationError> {
        let match_log = self.league_state_service.match_log().await?;
        let directory = self.league_state_service.player_directory().await?;
        Ok((match_log, directory))
    }
}

#[async_trait::async_trait]
impl<L: LeagueStateService + Send + Sync + 'static> SideStatisticsUseCase
    for SideStatisticsUseCaseImpl<L>
{
    async fn player_side_statistics(
        &self,
        player_id: &PlayerId,
    ) -> Result<PlayerSideView, SideStatisticsError> {
        let (match_log, directory) = match self.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("Failed to load side statistics for {}: {}", player_id, e);
                return Err(SideStatisticsError::Internal);
            }
        };
        if !directory.contains(player_id) && match_log.for_player(player_id).next().is_none() {
            return Err(SideStatisticsError::PlayerNotFound);
        }
        let statistics = SideStatistics::for_player(player_id, match_log.for_player(player_id));
        Ok(PlayerSideView {
            player_id: player_id.clone(),
            preferred_side: statistics.preferred_side(),
            statistics,
        })
    }

    async fn global_side_statistics(&self) -> Result<GlobalSideStatistics, SideStatisticsError> {
        match self.league_state_service.match_log().await {
            Ok(match_log) => Ok(GlobalSideStatistics::from_matches(match_log.all())),
            Err(e) => {
                log::error!("Failed to load global side statistics: {}", e);
                Err(SideStatisticsError::Internal)
            }
        }
    }
}
