use std::sync::Arc;

use league_core::{
    MatchLog, PlayerDirectory, SeasonStatistics, SeasonWindow, StandingsRow,
    StateDerivationEngine,
};

use crate::{
    domain::{DerivationError, matches::MatchRepository, players::PlayerMetadataRepository},
    services::derivation_cache::{DerivationCache, PlayerStates},
};

/// Read side of the league: every view is derived from the match log and
/// served from the cache until the next invalidation.
#[async_trait::async_trait]
pub trait LeagueStateService {
    async fn match_log(&self) -> Result<Arc<MatchLog>, DerivationError>;
    async fn player_directory(&self) -> Result<Arc<PlayerDirectory>, DerivationError>;
    async fn player_states(&self) -> Result<Arc<PlayerStates>, DerivationError>;
    async fn standings(
        &self,
        season: &SeasonWindow,
    ) -> Result<Arc<Vec<StandingsRow>>, DerivationError>;
    async fn season_statistics(
        &self,
        season: &SeasonWindow,
    ) -> Result<Arc<SeasonStatistics>, DerivationError>;
    /// Must follow every change to matches, players or seasons.
    fn invalidate(&self);
}

pub struct LeagueStateServiceImpl<M: MatchRepository, P: PlayerMetadataRepository> {
    match_repository: Arc<M>,
    player_repository: Arc<P>,
    engine: StateDerivationEngine,
    cache: DerivationCache,
}

impl<M: MatchRepository, P: PlayerMetadataRepository> LeagueStateServiceImpl<M, P> {
    pub fn new(
        match_repository: Arc<M>,
        player_repository: Arc<P>,
        engine: StateDerivationEngine,
        cache: DerivationCache,
    ) -> Self {
        Self {
            match_repository,
            player_repository,
            engine,
            cache,
        }
    }
}

#[async_trait::async_trait]
impl<M, P> LeagueStateService for LeagueStateServiceImpl<M, P>
where
    M: MatchRepository + Send + Sync + 'static,
    P: PlayerMetadataRepository + Send + Sync + 'static,
{
    async fn match_log(&self) -> Result<Arc<MatchLog>, DerivationError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.log(generation) {
            return Ok(cached);
        }
        let match_log = Arc::new(self.match_repository.load_log().await?);
        self.cache.insert_log(generation, match_log.clone());
        Ok(match_log)
    }

    async fn player_directory(&self) -> Result<Arc<PlayerDirectory>, DerivationError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.directory(generation) {
            return Ok(cached);
        }
        let directory = Arc::new(self.player_repository.load_directory().await?);
        self.cache.insert_directory(generation, directory.clone());
        Ok(directory)
    }

    async fn player_states(&self) -> Result<Arc<PlayerStates>, DerivationError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.player_states(generation) {
            return Ok(cached);
        }
        let match_log = self.match_log().await?;
        let directory = self.player_directory().await?;
        let states = Arc::new(self.engine.derive_all_players(&match_log, &directory));
        log::debug!("Derived {} player states", states.len());
        self.cache.insert_player_states(generation, states.clone());
        Ok(states)
    }

    async fn standings(
        &self,
        season: &SeasonWindow,
    ) -> Result<Arc<Vec<StandingsRow>>, DerivationError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.standings(generation, &season.id) {
            return Ok(cached);
        }
        let match_log = self.match_log().await?;
        let directory = self.player_directory().await?;
        let rows = Arc::new(
            self.engine
                .derive_season_standings(&match_log, season, &directory),
        );
        self.cache.insert_standings(generation, &season.id, rows.clone());
        Ok(rows)
    }

    async fn season_statistics(
        &self,
        season: &SeasonWindow,
    ) -> Result<Arc<SeasonStatistics>, DerivationError> {
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.season_statistics(generation, &season.id) {
            return Ok(cached);
        }
        let match_log = self.match_log().await?;
        let statistics = Arc::new(
            self.engine
                .derive_season_statistics(match_log.within(season)),
        );
        self.cache
            .insert_season_statistics(generation, &season.id, statistics.clone());
        Ok(statistics)
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }
}
