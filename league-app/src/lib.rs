use std::sync::Arc;

use league_core::StateDerivationEngine;

use crate::{
    domain::{
        matches::StoreMatchRepository, players::StorePlayerMetadataRepository,
        seasons::StoreSeasonRepository,
    },
    ports::store::Store,
    services::{
        derivation_cache::{DerivationCache, DerivationCacheConfig},
        league_state::{LeagueStateService, LeagueStateServiceImpl},
    },
    workflow::{
        invalidate_cache::{InvalidateCacheUseCase, InvalidateCacheUseCaseImpl},
        matches::{
            coinflip::{CoinflipUseCase, CoinflipUseCaseImpl},
            delete::{DeleteMatchUseCase, DeleteMatchUseCaseImpl},
            recent::{RecentMatchesUseCase, RecentMatchesUseCaseImpl},
            submit::{SubmitMatchUseCase, SubmitMatchUseCaseImpl},
        },
        player::{
            get_rating::{GetPlayerRatingUseCase, GetPlayerRatingUseCaseImpl},
            get_state::{GetPlayerStateUseCase, GetPlayerStateUseCaseImpl},
            list_states::{ListPlayerStatesUseCase, ListPlayerStatesUseCaseImpl},
            register::{RegisterPlayerUseCase, RegisterPlayerUseCaseImpl},
            side_stats::{SideStatisticsUseCase, SideStatisticsUseCaseImpl},
        },
        season::{
            create::{CreateSeasonUseCase, CreateSeasonUseCaseImpl},
            end::{EndSeasonUseCase, EndSeasonUseCaseImpl},
            get_active::{GetActiveSeasonUseCase, GetActiveSeasonUseCaseImpl},
            get_standings::{GetStandingsUseCase, GetStandingsUseCaseImpl},
            get_statistics::{GetSeasonStatisticsUseCase, GetSeasonStatisticsUseCaseImpl},
            list::{ListSeasonsUseCase, ListSeasonsUseCaseImpl},
        },
    },
};

pub mod domain;
pub mod ports;
pub mod services;
pub mod workflow;

pub struct Application {
    pub player_get_rating_use_case: Box<dyn GetPlayerRatingUseCase + Send + Sync + 'static>,
    pub player_get_state_use_case: Box<dyn GetPlayerStateUseCase + Send + Sync + 'static>,
    pub player_list_states_use_case: Box<dyn ListPlayerStatesUseCase + Send + Sync + 'static>,
    pub player_register_use_case: Box<dyn RegisterPlayerUseCase + Send + Sync + 'static>,
    pub side_statistics_use_case: Box<dyn SideStatisticsUseCase + Send + Sync + 'static>,

    pub match_submit_use_case: Box<dyn SubmitMatchUseCase + Send + Sync + 'static>,
    pub match_delete_use_case: Box<dyn DeleteMatchUseCase + Send + Sync + 'static>,
    pub match_recent_use_case: Box<dyn RecentMatchesUseCase + Send + Sync + 'static>,
    pub coinflip_use_case: Box<dyn CoinflipUseCase + Send + Sync + 'static>,

    pub season_create_use_case: Box<dyn CreateSeasonUseCase + Send + Sync + 'static>,
    pub season_end_use_case: Box<dyn EndSeasonUseCase + Send + Sync + 'static>,
    pub season_get_active_use_case: Box<dyn GetActiveSeasonUseCase + Send + Sync + 'static>,
    pub season_list_use_case: Box<dyn ListSeasonsUseCase + Send + Sync + 'static>,
    pub season_standings_use_case: Box<dyn GetStandingsUseCase + Send + Sync + 'static>,
    pub season_statistics_use_case: Box<dyn GetSeasonStatisticsUseCase + Send + Sync + 'static>,

    pub invalidate_cache_use_case: Box<dyn InvalidateCacheUseCase + Send + Sync + 'static>,
    pub league_state_service: Arc<dyn LeagueStateService + Send + Sync + 'static>,
}

pub fn build_application<S: Store + Send + Sync + 'static>(
    store: Arc<S>,
    cache_config: &DerivationCacheConfig,
) -> Application {
    let match_repository = Arc::new(StoreMatchRepository::new(store.clone()));
    let player_repository = Arc::new(StorePlayerMetadataRepository::new(store.clone()));
    let season_repository = Arc::new(StoreSeasonRepository::new(store.clone()));

    let league_state_service = Arc::new(LeagueStateServiceImpl::new(
        match_repository.clone(),
        player_repository.clone(),
        StateDerivationEngine::default(),
        DerivationCache::new(cache_config),
    ));

    Application {
        player_get_rating_use_case: Box::new(GetPlayerRatingUseCaseImpl::new(
            league_state_service.clone(),
        )),
        player_get_state_use_case: Box::new(GetPlayerStateUseCaseImpl::new(
            league_state_service.clone(),
        )),
        player_list_states_use_case: Box::new(ListPlayerStatesUseCaseImpl::new(
            league_state_service.clone(),
        )),
        player_register_use_case: Box::new(RegisterPlayerUseCaseImpl::new(
            player_repository.clone(),
            league_state_service.clone(),
        )),
        side_statistics_use_case: Box::new(SideStatisticsUseCaseImpl::new(
            league_state_service.clone(),
        )),

        match_submit_use_case: Box::new(SubmitMatchUseCaseImpl::new(
            match_repository.clone(),
            league_state_service.clone(),
        )),
        match_delete_use_case: Box::new(DeleteMatchUseCaseImpl::new(
            match_repository.clone(),
            league_state_service.clone(),
        )),
        match_recent_use_case: Box::new(RecentMatchesUseCaseImpl::new(
            league_state_service.clone(),
        )),
        coinflip_use_case: Box::new(CoinflipUseCaseImpl::new()),

        season_create_use_case: Box::new(CreateSeasonUseCaseImpl::new(
            season_repository.clone(),
            league_state_service.clone(),
        )),
        season_end_use_case: Box::new(EndSeasonUseCaseImpl::new(
            season_repository.clone(),
            league_state_service.clone(),
        )),
        season_get_active_use_case: Box::new(GetActiveSeasonUseCaseImpl::new(
            season_repository.clone(),
        )),
        season_list_use_case: Box::new(ListSeasonsUseCaseImpl::new(season_repository.clone())),
        season_standings_use_case: Box::new(GetStandingsUseCaseImpl::new(
            season_repository.clone(),
            league_state_service.clone(),
        )),
        season_statistics_use_case: Box::new(GetSeasonStatisticsUseCaseImpl::new(
            season_repository.clone(),
            league_state_service.clone(),
        )),

        invalidate_cache_use_case: Box::new(InvalidateCacheUseCaseImpl::new(
            league_state_service.clone(),
        )),
        league_state_service,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use league_core::{AchievementId, BASELINE_RATING, MatchId, PlayerId, SeasonId, Side};

    use super::*;
    use crate::{
        domain::matches::MatchRepository,
        ports::store::InMemoryStore,
        workflow::{
            matches::submit::{SubmitMatchCommand, SubmitMatchError},
            player::{get_state::GetPlayerStateError, register::RegisterPlayerError},
            season::{SeasonLookupError, end::EndSeasonError},
        },
    };

    async fn application() -> (Arc<InMemoryStore>, Application) {
        let store = Arc::new(InMemoryStore::new());
        let app = build_application(store.clone(), &DerivationCacheConfig::default());
        for (id, name) in [("anna", "Anna"), ("ben", "Ben"), ("carl", "Carl")] {
            app.player_register_use_case
                .register_player(PlayerId::from(id), name.to_string(), None)
                .await
                .unwrap();
        }
        (store, app)
    }

    fn command(p1: &str, p2: &str, s1: u32, s2: u32, day: u32) -> SubmitMatchCommand {
        let mut command = SubmitMatchCommand::new(PlayerId::from(p1), PlayerId::from(p2), s1, s2);
        command.played_at = Some(Utc.with_ymd_and_hms(2025, 4, day, 18, 0, 0).unwrap());
        command
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_blank_names() {
        let (_, app) = application().await;
        assert!(matches!(
            app.player_register_use_case
                .register_player(PlayerId::from("anna"), "Anna".to_string(), None)
                .await,
            Err(RegisterPlayerError::PlayerExists)
        ));
        assert!(matches!(
            app.player_register_use_case
                .register_player(PlayerId::from("dora"), "  ".to_string(), None)
                .await,
            Err(RegisterPlayerError::InvalidName)
        ));
    }

    #[tokio::test]
    async fn test_submitted_match_updates_derived_state() {
        let (_, app) = application().await;
        assert_eq!(
            app.player_get_rating_use_case
                .get_rating(&PlayerId::from("anna"))
                .await
                .unwrap(),
            BASELINE_RATING
        );

        let record = app
            .match_submit_use_case
            .submit_match(command("anna", "ben", 10, 0, 2))
            .await
            .unwrap();
        assert_eq!(record.player1_side, Some(Side::Blue));
        assert_eq!(record.player2_side, Some(Side::White));
        let deltas = record.rating_deltas.unwrap();

        let anna = app
            .player_get_state_use_case
            .get_state(&PlayerId::from("anna"))
            .await
            .unwrap();
        assert_eq!(anna.current_rating, BASELINE_RATING + deltas.player1);
        assert_eq!(anna.statistics.matches_played, 1);
        assert!(
            anna.achievements
                .iter()
                .any(|a| a.id == AchievementId::TopScorer)
        );
        assert!(
            anna.achievements
                .iter()
                .any(|a| a.id == AchievementId::HighestWin)
        );
        assert_eq!(
            app.player_get_rating_use_case
                .get_rating(&PlayerId::from("ben"))
                .await
                .unwrap(),
            BASELINE_RATING + deltas.player2
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_unknown_and_identical_players() {
        let (_, app) = application().await;
        assert!(matches!(
            app.match_submit_use_case
                .submit_match(command("anna", "zoe", 1, 0, 2))
                .await,
            Err(SubmitMatchError::UnknownPlayerReference(id)) if id == PlayerId::from("zoe")
        ));
        assert!(matches!(
            app.match_submit_use_case
                .submit_match(command("anna", "anna", 1, 0, 2))
                .await,
            Err(SubmitMatchError::InvalidMatch(_))
        ));

        let mut same_side = command("anna", "ben", 1, 0, 2);
        same_side.side1 = Some(Side::White);
        same_side.side2 = Some(Side::White);
        assert!(matches!(
            app.match_submit_use_case.submit_match(same_side).await,
            Err(SubmitMatchError::InvalidMatch(_))
        ));
        assert!(
            app.match_recent_use_case
                .recent_matches(10)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_single_side_fixes_the_other() {
        let (_, app) = application().await;
        let mut cmd = command("anna", "ben", 3, 2, 2);
        cmd.side1 = Some(Side::White);
        let record = app.match_submit_use_case.submit_match(cmd).await.unwrap();
        assert_eq!(record.player2_side, Some(Side::Blue));
    }

    #[tokio::test]
    async fn test_recent_and_delete() {
        let (_, app) = application().await;
        let first = app
            .match_submit_use_case
            .submit_match(command("anna", "ben", 5, 3, 2))
            .await
            .unwrap();
        let second = app
            .match_submit_use_case
            .submit_match(command("ben", "carl", 2, 2, 3))
            .await
            .unwrap();

        let recent = app.match_recent_use_case.recent_matches(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, second.id);

        assert!(
            app.match_delete_use_case
                .delete_match(&first.id)
                .await
                .unwrap()
        );
        assert!(
            !app.match_delete_use_case
                .delete_match(&MatchId::from("missing"))
                .await
                .unwrap()
        );
        let anna = app
            .player_list_states_use_case
            .list_states()
            .await
            .unwrap()[&PlayerId::from("anna")]
            .clone();
        assert_eq!(anna.statistics.matches_played, 0);
        assert_eq!(anna.current_rating, BASELINE_RATING);
        assert!(anna.rating_history.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_player_state() {
        let (_, app) = application().await;
        assert!(matches!(
            app.player_get_state_use_case
                .get_state(&PlayerId::from("nobody"))
                .await,
            Err(GetPlayerStateError::PlayerNotFound)
        ));
    }

    #[tokio::test]
    async fn test_season_lifecycle() {
        let (_, app) = application().await;
        let april = app
            .season_create_use_case
            .create_season(
                "April".to_string(),
                Some(Utc.with_ymd_and_hms(2025, 4, 17, 9, 30, 0).unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(
            april.start_date,
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
        );
        assert!(april.id.0.starts_with("season_"));

        app.match_submit_use_case
            .submit_match(command("anna", "ben", 5, 3, 2))
            .await
            .unwrap();
        app.match_submit_use_case
            .submit_match(command("carl", "ben", 4, 1, 3))
            .await
            .unwrap();

        let rows = app
            .season_standings_use_case
            .get_standings(&april.id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].player_id, PlayerId::from("carl"));
        assert_eq!(rows[2].player_id, PlayerId::from("ben"));

        let statistics = app
            .season_statistics_use_case
            .get_statistics(&april.id)
            .await
            .unwrap();
        assert_eq!(statistics.total_matches, 2);
        assert_eq!(statistics.total_goals, 13);

        let active = app
            .season_get_active_use_case
            .get_active_season()
            .await
            .unwrap();
        assert_eq!(active.map(|s| s.id), Some(april.id.clone()));

        assert!(matches!(
            app.season_end_use_case
                .end_season(
                    &april.id,
                    Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
                )
                .await,
            Err(EndSeasonError::EndBeforeStart)
        ));
        let ended = app
            .season_end_use_case
            .end_season(
                &april.id,
                Some(Utc.with_ymd_and_hms(2025, 4, 30, 23, 59, 59).unwrap()),
            )
            .await
            .unwrap();
        assert!(!ended.is_active);
        assert!(
            app.season_get_active_use_case
                .get_active_season()
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(app.season_list_use_case.list_seasons().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_side_statistics() {
        let (_, app) = application().await;
        app.match_submit_use_case
            .submit_match(command("anna", "ben", 5, 3, 2))
            .await
            .unwrap();
        let mut swapped = command("ben", "anna", 4, 2, 3);
        swapped.side1 = Some(Side::Blue);
        app.match_submit_use_case.submit_match(swapped).await.unwrap();

        let view = app
            .side_statistics_use_case
            .player_side_statistics(&PlayerId::from("anna"))
            .await
            .unwrap();
        assert_eq!(view.statistics.blue.wins, 1);
        assert_eq!(view.statistics.white.losses, 1);
        assert_eq!(view.preferred_side.map(|p| p.side), Some(Side::Blue));

        let global = app
            .side_statistics_use_case
            .global_side_statistics()
            .await
            .unwrap();
        assert_eq!(global.matches_with_sides, 2);
        assert_eq!(global.blue_wins, 2);
        assert_eq!(global.white_wins, 0);
    }

    #[tokio::test]
    async fn test_unknown_season() {
        let (_, app) = application().await;
        assert!(matches!(
            app.season_standings_use_case
                .get_standings(&SeasonId::from("nope"))
                .await,
            Err(SeasonLookupError::SeasonNotFound)
        ));
        assert!(matches!(
            app.season_end_use_case
                .end_season(&SeasonId::from("nope"), None)
                .await,
            Err(EndSeasonError::SeasonNotFound)
        ));
    }

    #[tokio::test]
    async fn test_external_write_needs_explicit_invalidation() {
        let (store, app) = application().await;
        app.player_list_states_use_case.list_states().await.unwrap();
        let reads = store.read_count();

        StoreMatchRepository::new(store.clone())
            .append(league_core::MatchRecord::new(
                MatchId::from("external"),
                PlayerId::from("anna"),
                PlayerId::from("carl"),
                2,
                1,
                Utc.with_ymd_and_hms(2025, 4, 5, 18, 0, 0).unwrap(),
            ))
            .await
            .unwrap();
        let states = app.player_list_states_use_case.list_states().await.unwrap();
        assert_eq!(states[&PlayerId::from("anna")].statistics.matches_played, 0);
        assert_eq!(store.read_count(), reads);

        app.invalidate_cache_use_case.invalidate_cache();
        let states = app.player_list_states_use_case.list_states().await.unwrap();
        assert_eq!(states[&PlayerId::from("anna")].statistics.matches_played, 1);
    }
}
