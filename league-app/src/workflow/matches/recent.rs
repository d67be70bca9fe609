use std::sync::Arc;

use league_core::{MatchLog, MatchRecord};

use crate::services::league_state::LeagueStateService;

#[async_trait::async_trait]
pub trait RecentMatchesUseCase {
    /// Newest first.
    async fn recent_matches(&self, limit: usize) -> Result<Vec<MatchRecord>, RecentMatchesError>;
}

#[derive(Debug)]
pub enum RecentMatchesError {
    Internal,
}

pub struct RecentMatchesUseCaseImpl<L: LeagueStateService> {
    league_state_service: Arc<L>,
}

impl<L: LeagueStateService> RecentMatchesUseCaseImpl<L> {
    pub fn new(league_state_service: Arc<L>) -> Self {
        Self {
            league_state_service,
        }
    }
}

#[async_trait::async_trait]
impl<L: LeagueStateService + Send + Sync + 'static> RecentMatchesUseCase
    for RecentMatchesUseCaseImpl<L>
{
    async fn recent_matches(&self, limit: usize) -> Result<Vec<MatchRecord>, RecentMatchesError> {
        let match_log = self.league_state_service.match_log().await.map_err(|e| {
            log::error!("Failed to load match log: {}", e);
            RecentMatchesError::Internal
        })?;
        Ok(MatchLog::chronological(match_log.all())
            .into_iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
