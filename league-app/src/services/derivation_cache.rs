use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use league_core::{
    DerivedPlayerState, MatchLog, PlayerDirectory, PlayerId, SeasonId, SeasonStatistics,
    StandingsRow,
};

#[derive(Clone, Debug)]
pub struct DerivationCacheConfig {
    pub max_capacity: u64,
    pub time_to_live: Duration,
}

impl Default for DerivationCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 64,
            time_to_live: Duration::from_secs(60 * 60),
        }
    }
}

pub type PlayerStates = BTreeMap<PlayerId, DerivedPlayerState>;

/// Memoised log reads and derivations for one process.
///
/// Entries are keyed by a generation number. `invalidate` moves to a new
/// generation and drops everything, so a load that started before the
/// invalidation can never be served afterwards.
pub struct DerivationCache {
    generation: AtomicU64,
    logs: moka::sync::Cache<u64, Arc<MatchLog>>,
    directories: moka::sync::Cache<u64, Arc<PlayerDirectory>>,
    player_states: moka::sync::Cache<u64, Arc<PlayerStates>>,
    standings: moka::sync::Cache<(u64, SeasonId), Arc<Vec<StandingsRow>>>,
    season_statistics: moka::sync::Cache<(u64, SeasonId), Arc<SeasonStatistics>>,
}

impl DerivationCache {
    pub fn new(config: &DerivationCacheConfig) -> Self {
        Self {
            generation: AtomicU64::new(0),
            logs: Self::build_cache(config),
            directories: Self::build_cache(config),
            player_states: Self::build_cache(config),
            standings: Self::build_cache(config),
            season_statistics: Self::build_cache(config),
        }
    }

    fn build_cache<K, V>(config: &DerivationCacheConfig) -> moka::sync::Cache<K, V>
    where
        K: std::hash::Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        moka::sync::Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.time_to_live)
            .build()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.logs.invalidate_all();
        self.directories.invalidate_all();
        self.player_states.invalidate_all();
        self.standings.invalidate_all();
        self.season_statistics.invalidate_all();
        log::info!("Derivation cache invalidated, now at generation {}", generation);
    }

    pub fn log(&self, generation: u64) -> Option<Arc<MatchLog>> {
        self.logs.get(&generation)
    }

    pub fn insert_log(&self, generation: u64, log: Arc<MatchLog>) {
        self.logs.insert(generation, log);
    }

    pub fn directory(&self, generation: u64) -> Option<Arc<PlayerDirectory>> {
        self.directories.get(&generation)
    }

    pub fn insert_directory(&self, generation: u64, directory: Arc<PlayerDirectory>) {
        self.directories.insert(generation, directory);
    }

    pub fn player_states(&self, generation: u64) -> Option<Arc<PlayerStates>> {
        self.player_states.get(&generation)
    }

    pub fn insert_player_states(&self, generation: u64, states: Arc<PlayerStates>) {
        self.player_states.insert(generation, states);
    }

    pub fn standings(&self, generation: u64, season_id: &SeasonId) -> Option<Arc<Vec<StandingsRow>>> {
        self.standings.get(&(generation, season_id.clone()))
    }

    pub fn insert_standings(
        &self,
        generation: u64,
        season_id: &SeasonId,
        rows: Arc<Vec<StandingsRow>>,
    ) {
        self.standings.insert((generation, season_id.clone()), rows);
    }

    pub fn season_statistics(
        &self,
        generation: u64,
        season_id: &SeasonId,
    ) -> Option<Arc<SeasonStatistics>> {
        self.season_statistics.get(&(generation, season_id.clone()))
    }

    pub fn insert_season_statistics(
        &self,
        generation: u64,
        season_id: &SeasonId,
        statistics: Arc<SeasonStatistics>,
    ) {
        self.season_statistics
            .insert((generation, season_id.clone()), statistics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_moves_generation_and_drops_entries() {
        let cache = DerivationCache::new(&DerivationCacheConfig::default());
        let generation = cache.generation();
        cache.insert_log(generation, Arc::new(MatchLog::default()));
        assert!(cache.log(generation).is_some());

        cache.invalidate();
        assert_eq!(cache.generation(), generation + 1);
        assert!(cache.log(generation).is_none());
        assert!(cache.log(cache.generation()).is_none());
    }

    #[test]
    fn test_stale_insert_is_not_served() {
        let cache = DerivationCache::new(&DerivationCacheConfig::default());
        let stale = cache.generation();
        cache.invalidate();
        cache.insert_directory(stale, Arc::new(PlayerDirectory::new()));
        assert!(cache.directory(cache.generation()).is_none());
    }
}
