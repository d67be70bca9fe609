use std::sync::Arc;

use chrono::{DateTime, Utc};
use league_core::{SeasonId, SeasonWindow};

use crate::{
    domain::{RepoRetrieveError, seasons::SeasonRepository},
    services::league_state::LeagueStateService,
};

#[async_trait::async_trait]
pub trait EndSeasonUseCase {
    async fn end_season(
        &self,
        season_id: &SeasonId,
        end: Option<DateTime<Utc>>,
    ) -> Result<SeasonWindow, EndSeasonError>;
}

#[derive(Debug)]
pub enum EndSeasonError {
    SeasonNotFound,
    EndBeforeStart,
    Internal,
}

pub struct EndSeasonUseCaseImpl<S: SeasonRepository, L: LeagueStateService> {
    season_repository: Arc<S>,
    league_state_service: Arc<L>,
}

impl<S: SeasonRepository, L: LeagueStateService> EndSeasonUseCaseImpl<S, L> {
    pub fn new(season_repository: Arc<S>, league_state_service: Arc<L>) -> Self {
        Self {
            season_repository,
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<S, L> EndSeasonUseCase for EndSeasonUseCaseImpl<S, L>
where
    S: SeasonRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn end_season(
        &self,
        season_id: &SeasonId,
        end: Option<DateTime<Utc>>,
    ) -> Result<SeasonWindow, EndSeasonError> {
        let mut season = match self.season_repository.get_season(season_id).await {
            Ok(season) => season,
            Err(RepoRetrieveError::NotFound) => return Err(EndSeasonError::SeasonNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve season {}: {}", season_id, e);
                return Err(EndSeasonError::Internal);
            }
        };
        let end_date = end.unwrap_or_else(Utc::now);
        if end_date < season.start_date {
            return Err(EndSeasonError::EndBeforeStart);
        }
        season.end(end_date);

        if let Err(e) = self.season_repository.save_season(season.clone()).await {
            log::error!("Failed to save season {}: {}", season_id, e);
            return Err(EndSeasonError::Internal);
        }
        self.league_state_service.invalidate();
        log::info!("Ended season {} at {}", season_id, end_date);
        Ok(season)
    }
}
