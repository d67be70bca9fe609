use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    MatchId, PlayerId,
    achievement::{AchievementEvaluator, LeadershipContext, UnlockedAchievement},
    match_log::MatchLog,
    player::PlayerDirectory,
    rating::{BASELINE_RATING, RatingModel},
    record::{MatchRecord, RatingDeltas},
    season::SeasonWindow,
    standings::{self, SeasonStatistics, StandingsRow},
    stats::PlayerStatistics,
};

/// Ratings going into a match and the deltas it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatedMatch {
    pub rating_before_player1: i32,
    pub rating_before_player2: i32,
    pub deltas: RatingDeltas,
}

/// Every rating change in the log, computed by walking it oldest first.
///
/// A match is always rated from both players' ratings right before it, so
/// the deltas only depend on the log. Deltas stored on a record are never
/// used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RatingReplay {
    rated: HashMap<MatchId, RatedMatch>,
    ratings: HashMap<PlayerId, i32>,
}

impl RatingReplay {
    /// `chronological` must already be sorted.
    pub fn replay(model: &RatingModel, chronological: &[&MatchRecord]) -> Self {
        let mut replay = Self {
            rated: HashMap::with_capacity(chronological.len()),
            ratings: HashMap::new(),
        };
        for record in chronological {
            let before1 = replay.rating_of(&record.player1_id);
            let before2 = replay.rating_of(&record.player2_id);
            let deltas = model.calculate_rating_changes(
                before1,
                before2,
                record.score_player1,
                record.score_player2,
            );
            if let Some(stored) = record.rating_deltas.filter(|stored| *stored != deltas) {
                log::debug!(
                    "Stored rating change {:?} for match {} differs from replayed {:?}",
                    stored,
                    record.id,
                    deltas
                );
            }
            replay
                .ratings
                .insert(record.player1_id.clone(), before1 + deltas.player1);
            replay
                .ratings
                .insert(record.player2_id.clone(), before2 + deltas.player2);
            replay.rated.insert(
                record.id.clone(),
                RatedMatch {
                    rating_before_player1: before1,
                    rating_before_player2: before2,
                    deltas,
                },
            );
        }
        replay
    }

    pub fn rated(&self, match_id: &MatchId) -> Option<&RatedMatch> {
        self.rated.get(match_id)
    }

    pub fn rating_of(&self, player_id: &PlayerId) -> i32 {
        self.ratings
            .get(player_id)
            .copied()
            .unwrap_or(BASELINE_RATING)
    }

    pub fn ratings(&self) -> &HashMap<PlayerId, i32> {
        &self.ratings
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RatingChangeReason {
    Initial,
    Match {
        #[serde(rename = "matchId")]
        match_id: MatchId,
        #[serde(rename = "opponentId")]
        opponent_id: PlayerId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingHistoryEntry {
    pub rating: i32,
    pub delta: i32,
    pub timestamp: DateTime<Utc>,
    pub reason: RatingChangeReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedPlayerState {
    pub id: PlayerId,
    pub name: String,
    pub nickname: Option<String>,
    pub current_rating: i32,
    pub rating_history: Vec<RatingHistoryEntry>,
    pub statistics: PlayerStatistics,
    pub achievements: Vec<UnlockedAchievement>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_match: Option<DateTime<Utc>>,
}

/// Whole-log facts every player's derivation reads.
struct DerivationContext<'a> {
    chronological: Vec<&'a MatchRecord>,
    replay: RatingReplay,
    leadership: LeadershipContext,
}

impl<'a> DerivationContext<'a> {
    fn build(model: &RatingModel, log: &'a MatchLog) -> Self {
        let chronological = MatchLog::chronological(log.all());
        let replay = RatingReplay::replay(model, &chronological);
        let leadership = LeadershipContext::from_chronological(&chronological);
        Self {
            chronological,
            replay,
            leadership,
        }
    }
}

/// Turns a match log into player states, standings and season statistics.
///
/// Nothing here is stored or mutated; every call recomputes from the log it
/// is handed.
#[derive(Clone, Debug, Default)]
pub struct StateDerivationEngine {
    rating_model: RatingModel,
    evaluator: AchievementEvaluator,
}

impl StateDerivationEngine {
    pub fn new(rating_model: RatingModel, evaluator: AchievementEvaluator) -> Self {
        Self {
            rating_model,
            evaluator,
        }
    }

    pub fn rating_model(&self) -> &RatingModel {
        &self.rating_model
    }

    /// Current rating of every player in the log.
    pub fn current_ratings(&self, log: &MatchLog) -> HashMap<PlayerId, i32> {
        let chronological = MatchLog::chronological(log.all());
        RatingReplay::replay(&self.rating_model, &chronological).ratings
    }

    /// Derives every player in the log or the directory.
    ///
    /// The log is sorted and grouped by player once, so the cost is linear in
    /// the number of matches rather than matches times players.
    pub fn derive_all_players(
        &self,
        log: &MatchLog,
        directory: &PlayerDirectory,
    ) -> BTreeMap<PlayerId, DerivedPlayerState> {
        let context = DerivationContext::build(&self.rating_model, log);
        let grouped = MatchLog::group_by_player(&context.chronological);

        for player_id in grouped.keys() {
            if !directory.contains(player_id) {
                log::warn!("Match log references unknown player {}", player_id);
            }
        }

        let mut ids: Vec<&PlayerId> = grouped.keys().copied().collect();
        ids.extend(directory.ids().filter(|id| !grouped.contains_key(id)));

        ids.into_iter()
            .map(|player_id| {
                let matches = grouped.get(player_id).map(Vec::as_slice).unwrap_or(&[]);
                let state = self.build_state(&context, directory, player_id, matches);
                (player_id.clone(), state)
            })
            .collect()
    }

    /// One player's state. Unknown ids yield the baseline state.
    pub fn derive_player(
        &self,
        log: &MatchLog,
        directory: &PlayerDirectory,
        player_id: &PlayerId,
    ) -> DerivedPlayerState {
        let context = DerivationContext::build(&self.rating_model, log);
        let matches: Vec<&MatchRecord> = context
            .chronological
            .iter()
            .copied()
            .filter(|r| r.involves(player_id))
            .collect();
        if !matches.is_empty() && !directory.contains(player_id) {
            log::warn!("Match log references unknown player {}", player_id);
        }
        self.build_state(&context, directory, player_id, &matches)
    }

    pub fn derive_standings<'a, I>(&self, matches: I, directory: &PlayerDirectory) -> Vec<StandingsRow>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        standings::derive_standings(matches, directory)
    }

    pub fn derive_season_standings(
        &self,
        log: &MatchLog,
        season: &SeasonWindow,
        directory: &PlayerDirectory,
    ) -> Vec<StandingsRow> {
        standings::derive_standings(log.within(season), directory)
    }

    pub fn derive_season_statistics<'a, I>(&self, matches: I) -> SeasonStatistics
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        standings::derive_season_statistics(matches)
    }

    fn build_state(
        &self,
        context: &DerivationContext<'_>,
        directory: &PlayerDirectory,
        player_id: &PlayerId,
        matches: &[&MatchRecord],
    ) -> DerivedPlayerState {
        let profile = directory.get(player_id);
        let mut statistics = PlayerStatistics::default();
        let mut rating_history = Vec::with_capacity(matches.len() + 1);
        let mut rating = BASELINE_RATING;
        let mut counted = Vec::with_capacity(matches.len());

        if let Some(first) = matches.first() {
            rating_history.push(RatingHistoryEntry {
                rating,
                delta: 0,
                timestamp: first.played_at,
                reason: RatingChangeReason::Initial,
            });
        }

        for record in matches {
            let Some(view) = record.perspective(player_id) else {
                log::error!("Match {} grouped under uninvolved player {}", record.id, player_id);
                continue;
            };
            let Some(rated) = context.replay.rated(&record.id) else {
                log::error!(
                    "Match {} missing from rating replay, left out of {}'s state",
                    record.id,
                    player_id
                );
                continue;
            };
            let delta = if view.is_player1 {
                rated.deltas.player1
            } else {
                rated.deltas.player2
            };
            rating += delta;
            rating_history.push(RatingHistoryEntry {
                rating,
                delta,
                timestamp: record.played_at,
                reason: RatingChangeReason::Match {
                    match_id: record.id.clone(),
                    opponent_id: view.opponent.clone(),
                },
            });
            statistics.record(view.outcome, view.goals_for, view.goals_against);
            counted.push(*record);
        }
        debug_assert_eq!(rating, context.replay.rating_of(player_id));

        let achievements = self.evaluator.evaluate(
            player_id,
            &statistics,
            counted.iter().copied(),
            &context.leadership,
        );

        DerivedPlayerState {
            id: player_id.clone(),
            name: directory.name_of(player_id),
            nickname: profile.and_then(|p| p.nickname.clone()),
            current_rating: rating,
            rating_history,
            statistics,
            achievements,
            created_at: profile
                .and_then(|p| p.created_at)
                .or_else(|| counted.first().map(|r| r.played_at)),
            last_match: counted.last().map(|r| r.played_at),
        }
    }
}
