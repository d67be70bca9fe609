use league_core::{SeasonId, SeasonWindow};

use crate::domain::{RepoRetrieveError, seasons::SeasonRepository};

pub mod create;
pub mod end;
pub mod get_active;
pub mod get_standings;
pub mod get_statistics;
pub mod list;

/// Errors shared by use cases that look a season up first.
#[derive(Debug)]
pub enum SeasonLookupError {
    SeasonNotFound,
    Internal,
}

pub(crate) async fn find_season<S: SeasonRepository + Send + Sync>(
    season_repository: &S,
    season_id: &SeasonId,
) -> Result<SeasonWindow, SeasonLookupError> {
    match season_repository.get_season(season_id).await {
        Ok(season) => Ok(season),
        Err(RepoRetrieveError::NotFound) => Err(SeasonLookupError::SeasonNotFound),
        Err(RepoRetrieveError::StorageError(e)) => {
            log::error!("Failed to retrieve season {}: {}", season_id, e);
            Err(SeasonLookupError::Internal)
        }
    }
}
