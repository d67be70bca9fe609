use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    PlayerId,
    match_log::MatchLog,
    record::{MatchOutcome, MatchRecord},
    stats::PlayerStatistics,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AchievementId {
    #[serde(rename = "winning_streak_3")]
    WinningStreak3,
    #[serde(rename = "winning_streak_5")]
    WinningStreak5,
    #[serde(rename = "highest_win")]
    HighestWin,
    #[serde(rename = "top_scorer")]
    TopScorer,
    #[serde(rename = "bad_keeper")]
    BadKeeper,
    #[serde(rename = "perfect_record")]
    PerfectRecord,
    #[serde(rename = "goal_machine")]
    GoalMachine,
    #[serde(rename = "iron_defense")]
    IronDefense,
    #[serde(rename = "unlucky")]
    Unlucky,
    #[serde(rename = "veteran")]
    Veteran,
    #[serde(rename = "goal_difference_king")]
    GoalDifferenceKing,
    #[serde(rename = "balanced")]
    Balanced,
}

impl AchievementId {
    pub const ALL: [AchievementId; 12] = [
        AchievementId::WinningStreak3,
        AchievementId::WinningStreak5,
        AchievementId::HighestWin,
        AchievementId::TopScorer,
        AchievementId::BadKeeper,
        AchievementId::PerfectRecord,
        AchievementId::GoalMachine,
        AchievementId::IronDefense,
        AchievementId::Unlucky,
        AchievementId::Veteran,
        AchievementId::GoalDifferenceKing,
        AchievementId::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::WinningStreak3 => "winning_streak_3",
            AchievementId::WinningStreak5 => "winning_streak_5",
            AchievementId::HighestWin => "highest_win",
            AchievementId::TopScorer => "top_scorer",
            AchievementId::BadKeeper => "bad_keeper",
            AchievementId::PerfectRecord => "perfect_record",
            AchievementId::GoalMachine => "goal_machine",
            AchievementId::IronDefense => "iron_defense",
            AchievementId::Unlucky => "unlucky",
            AchievementId::Veteran => "veteran",
            AchievementId::GoalDifferenceKing => "goal_difference_king",
            AchievementId::Balanced => "balanced",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AchievementId::WinningStreak3 => "Winning Streak (3)",
            AchievementId::WinningStreak5 => "Winning Streak (5)",
            AchievementId::HighestWin => "Highest Win",
            AchievementId::TopScorer => "Top Scorer",
            AchievementId::BadKeeper => "Bad Keeper",
            AchievementId::PerfectRecord => "Perfect Record",
            AchievementId::GoalMachine => "Goal Machine",
            AchievementId::IronDefense => "Iron Defense",
            AchievementId::Unlucky => "Unlucky",
            AchievementId::Veteran => "Veteran",
            AchievementId::GoalDifferenceKing => "Goal Difference King",
            AchievementId::Balanced => "Balanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::WinningStreak3 => "3 wins in a row",
            AchievementId::WinningStreak5 => "5 wins in a row",
            AchievementId::HighestWin => "Won a single match by 10 or more goals",
            AchievementId::TopScorer => "Most goals scored",
            AchievementId::BadKeeper => "Most goals conceded",
            AchievementId::PerfectRecord => "Only wins (min. 3 matches)",
            AchievementId::GoalMachine => "Averaging 5+ goals per match (min. 3 matches)",
            AchievementId::IronDefense => {
                "Conceding fewer than 3 goals per match on average (min. 3 matches)"
            }
            AchievementId::Unlucky => "No wins after 5+ matches",
            AchievementId::Veteran => "10+ matches played",
            AchievementId::GoalDifferenceKing => "Goal difference of +20 or better",
            AchievementId::Balanced => "As many goals scored as conceded (min. 5 matches)",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AchievementId::WinningStreak3 => "🏆",
            AchievementId::WinningStreak5 => "👑",
            AchievementId::HighestWin => "⚡",
            AchievementId::TopScorer => "⚽",
            AchievementId::BadKeeper => "💀",
            AchievementId::PerfectRecord => "⭐",
            AchievementId::GoalMachine => "🚀",
            AchievementId::IronDefense => "🛡️",
            AchievementId::Unlucky => "😵",
            AchievementId::Veteran => "🎖️",
            AchievementId::GoalDifferenceKing => "📈",
            AchievementId::Balanced => "⚖️",
        }
    }

    /// Whether the rule needs totals of other players.
    pub fn is_cross_player(&self) -> bool {
        matches!(self, AchievementId::TopScorer | AchievementId::BadKeeper)
    }

    pub fn definition(&self) -> AchievementDefinition {
        AchievementDefinition {
            id: *self,
            name: self.name(),
            description: self.description(),
            icon: self.icon(),
        }
    }

    /// Every achievement a player can earn, in display order.
    pub fn catalogue() -> Vec<AchievementDefinition> {
        Self::ALL.iter().map(|id| id.definition()).collect()
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub id: AchievementId,
    pub unlocked_at: DateTime<Utc>,
}

/// Tracks the unique holder of the highest running total.
#[derive(Default)]
struct LeaderTracker<'a> {
    totals: HashMap<&'a PlayerId, u64>,
    max: u64,
    leader: Option<&'a PlayerId>,
    since: HashMap<PlayerId, DateTime<Utc>>,
}

impl<'a> LeaderTracker<'a> {
    fn add(&mut self, player_id: &'a PlayerId, amount: u32) {
        if amount == 0 {
            return;
        }
        let total = self.totals.entry(player_id).or_default();
        *total += u64::from(amount);
        if *total > self.max {
            self.max = *total;
            self.leader = Some(player_id);
        } else if *total == self.max {
            self.leader = None;
        }
    }

    fn settle(&mut self, at: DateTime<Utc>) {
        if let Some(leader) = self.leader {
            self.since.entry(leader.clone()).or_insert(at);
        }
    }
}

/// When each player first became the sole leader in goals scored and goals
/// conceded, over one chronological scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeadershipContext {
    top_scorer_since: HashMap<PlayerId, DateTime<Utc>>,
    bad_keeper_since: HashMap<PlayerId, DateTime<Utc>>,
}

impl LeadershipContext {
    /// `matches` must already be in chronological order.
    pub fn from_chronological(matches: &[&MatchRecord]) -> Self {
        let mut scored = LeaderTracker::default();
        let mut conceded = LeaderTracker::default();
        for record in matches {
            scored.add(&record.player1_id, record.score_player1);
            scored.add(&record.player2_id, record.score_player2);
            conceded.add(&record.player1_id, record.score_player2);
            conceded.add(&record.player2_id, record.score_player1);
            scored.settle(record.played_at);
            conceded.settle(record.played_at);
        }
        Self {
            top_scorer_since: scored.since,
            bad_keeper_since: conceded.since,
        }
    }

    pub fn top_scorer_since(&self, player_id: &PlayerId) -> Option<DateTime<Utc>> {
        self.top_scorer_since.get(player_id).copied()
    }

    pub fn bad_keeper_since(&self, player_id: &PlayerId) -> Option<DateTime<Utc>> {
        self.bad_keeper_since.get(player_id).copied()
    }
}

/// Running state of one player's match prefix.
#[derive(Default)]
struct Prefix {
    stats: PlayerStatistics,
    streak: u32,
    winning_margin: u32,
}

impl Prefix {
    fn satisfies(&self, id: AchievementId) -> bool {
        let s = &self.stats;
        match id {
            AchievementId::WinningStreak3 => self.streak >= 3,
            AchievementId::WinningStreak5 => self.streak >= 5,
            AchievementId::HighestWin => self.winning_margin >= 10,
            AchievementId::PerfectRecord => {
                s.matches_played >= 3 && s.losses == 0 && s.draws == 0
            }
            AchievementId::GoalMachine => {
                s.matches_played >= 3 && s.goals_scored >= 5 * u64::from(s.matches_played)
            }
            AchievementId::IronDefense => {
                s.matches_played >= 3 && s.goals_conceded < 3 * u64::from(s.matches_played)
            }
            AchievementId::Unlucky => s.matches_played >= 5 && s.wins == 0,
            AchievementId::Veteran => s.matches_played >= 10,
            AchievementId::GoalDifferenceKing => s.goal_difference() >= 20,
            AchievementId::Balanced => {
                s.matches_played >= 5 && s.goals_scored == s.goals_conceded
            }
            AchievementId::TopScorer | AchievementId::BadKeeper => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AchievementEvaluator;

impl AchievementEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Scans the player's matches oldest first and unlocks each rule at the
    /// first match after which it holds. Unlocks are never revoked.
    ///
    /// `matches` may come in any order. Matches not involving `player_id`
    /// are ignored.
    pub fn evaluate<'a, I>(
        &self,
        player_id: &PlayerId,
        statistics: &PlayerStatistics,
        matches: I,
        leadership: &LeadershipContext,
    ) -> Vec<UnlockedAchievement>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        if statistics.matches_played == 0 {
            return Vec::new();
        }

        let mut unlocked: BTreeMap<AchievementId, DateTime<Utc>> = BTreeMap::new();
        let mut prefix = Prefix::default();
        for record in MatchLog::chronological(matches) {
            let Some(view) = record.perspective(player_id) else {
                continue;
            };
            prefix
                .stats
                .record(view.outcome, view.goals_for, view.goals_against);
            prefix.streak = match view.outcome {
                MatchOutcome::Win => prefix.streak + 1,
                MatchOutcome::Draw | MatchOutcome::Loss => 0,
            };
            prefix.winning_margin = view.winning_margin();

            for id in AchievementId::ALL {
                if !id.is_cross_player() && !unlocked.contains_key(&id) && prefix.satisfies(id) {
                    unlocked.insert(id, record.played_at);
                }
            }
        }
        debug_assert_eq!(&prefix.stats, statistics);

        if let Some(at) = leadership.top_scorer_since(player_id) {
            unlocked.insert(AchievementId::TopScorer, at);
        }
        if let Some(at) = leadership.bad_keeper_since(player_id) {
            unlocked.insert(AchievementId::BadKeeper, at);
        }

        let mut result: Vec<UnlockedAchievement> = unlocked
            .into_iter()
            .map(|(id, unlocked_at)| UnlockedAchievement { id, unlocked_at })
            .collect();
        result.sort_by(|a, b| a.unlocked_at.cmp(&b.unlocked_at).then(a.id.cmp(&b.id)));
        result
    }
}
