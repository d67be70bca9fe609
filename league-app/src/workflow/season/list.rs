use std::sync::Arc;

use league_core::SeasonWindow;

use crate::domain::seasons::SeasonRepository;

#[async_trait::async_trait]
pub trait ListSeasonsUseCase {
    async fn list_seasons(&self) -> Result<Vec<SeasonWindow>, ListSeasonsError>;
}

#[derive(Debug)]
pub enum ListSeasonsError {
    Internal,
}

pub struct ListSeasonsUseCaseImpl<S: SeasonRepository> {
    season_repository: Arc<S>,
}

impl<S: SeasonRepository> ListSeasonsUseCaseImpl<S> {
    pub fn new(season_repository: Arc<S>) -> Self {
        Self { season_repository }
    }
}

#[async_trait::async_trait]
impl<S: SeasonRepository + Send + Sync + 'static> ListSeasonsUseCase
    for ListSeasonsUseCaseImpl<S>
{
    async fn list_seasons(&self) -> Result<Vec<SeasonWindow>, ListSeasonsError> {
        let mut seasons = self.season_repository.list_seasons().await.map_err(|e| {
            log::error!("Failed to list seasons: {}", e);
            ListSeasonsError::Internal
        })?;
        seasons.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(seasons)
    }
}
