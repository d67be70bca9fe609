use std::sync::Arc;

use crate::services::league_state::LeagueStateService;

pub trait InvalidateCacheUseCase {
    fn invalidate_cache(&self);
}

pub struct InvalidateCacheUseCaseImpl<L: LeagueStateService> {
    league_state_service: Arc<L>,
}

impl<L: LeagueStateService> InvalidateCacheUseCaseImpl<L> {
    pub fn new(league_state_service: Arc<L>) -> Self {
        Self {
            league_state_service,
        }
    }
}

impl<L: LeagueStateService> InvalidateCacheUseCase for InvalidateCacheUseCaseImpl<L> {
    fn invalidate_cache(&self) {
        self.league_state_service.invalidate();
    }
}
