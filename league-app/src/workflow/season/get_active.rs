use std::sync::Arc;

use league_core::SeasonWindow;

use crate::domain::seasons::SeasonRepository;

#[async_trait::async_trait]
pub trait GetActiveSeasonUseCase {
    async fn get_active_season(&self) -> Result<Option<SeasonWindow>, GetActiveSeasonError>;
}

#[derive(Debug)]
pub enum GetActiveSeasonError {
    Internal,
}

pub struct GetActiveSeasonUseCaseImpl<S: SeasonRepository> {
    season_repository: Arc<S>,
}

impl<S: SeasonRepository> GetActiveSeasonUseCaseImpl<S> {
    pub fn new(season_repository: Arc<S>) -> Self {
        Self { season_repository }
    }
}

#[async_trait::async_trait]
impl<S: SeasonRepository + Send + Sync + 'static> GetActiveSeasonUseCase
    for GetActiveSeasonUseCaseImpl<S>
{
    /// Earliest started season still marked active.
    async fn get_active_season(&self) -> Result<Option<SeasonWindow>, GetActiveSeasonError> {
        match self.season_repository.list_seasons().await {
            Ok(seasons) => Ok(seasons
                .into_iter()
                .filter(|season| season.is_active)
                .min_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))),
            Err(e) => {
                log::error!("Failed to list seasons: {}", e);
                Err(GetActiveSeasonError::Internal)
            }
        }
    }
}
