use std::sync::Arc;

use chrono::{DateTime, Utc};
use league_core::{SeasonId, SeasonWindow};

use crate::{domain::seasons::SeasonRepository, services::league_state::LeagueStateService};

#[async_trait::async_trait]
pub trait CreateSeasonUseCase {
    /// `start` is snapped to the first instant of its month and defaults to
    /// the current month.
    async fn create_season(
        &self,
        name: String,
        start: Option<DateTime<Utc>>,
    ) -> Result<SeasonWindow, CreateSeasonError>;
}

#[derive(Debug)]
pub enum CreateSeasonError {
    InvalidName,
    Internal,
}

pub struct CreateSeasonUseCaseImpl<S: SeasonRepository, L: LeagueStateService> {
    season_repository: Arc<S>,
    league_state_service: Arc<L>,
}

impl<S: SeasonRepository, L: LeagueStateService> CreateSeasonUseCaseImpl<S, L> {
    pub fn new(season_repository: Arc<S>, league_state_service: Arc<L>) -> Self {
        Self {
            season_repository,
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<S, L> CreateSeasonUseCase for CreateSeasonUseCaseImpl<S, L>
where
    S: SeasonRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn create_season(
        &self,
        name: String,
        start: Option<DateTime<Utc>>,
    ) -> Result<SeasonWindow, CreateSeasonError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CreateSeasonError::InvalidName);
        }
        let start_date = SeasonWindow::month_start(start.unwrap_or_else(Utc::now));
        let season_id = SeasonId(format!("season_{}", uuid::Uuid::new_v4().simple()));
        let season = SeasonWindow::new(season_id, name, start_date);

        if let Err(e) = self.season_repository.save_season(season.clone()).await {
            log::error!("Failed to save season {}: {}", season.id, e);
            return Err(CreateSeasonError::Internal);
        }
        self.league_state_service.invalidate();
        log::info!("Created season {} starting {}", season.id, season.start_date);
        Ok(season)
    }
}
