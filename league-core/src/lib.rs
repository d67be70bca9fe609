mod achievement;
mod derivation;
mod match_log;
mod player;
mod rating;
mod record;
mod season;
mod sides;
mod standings;
mod stats;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use achievement::{
    AchievementDefinition, AchievementEvaluator, AchievementId, LeadershipContext,
    UnlockedAchievement,
};
pub use derivation::{
    DerivedPlayerState, RatedMatch, RatingChangeReason, RatingHistoryEntry, RatingReplay,
    StateDerivationEngine,
};
pub use match_log::MatchLog;
pub use player::{PlayerDirectory, PlayerProfile};
pub use rating::{BASELINE_RATING, RatingModel};
pub use record::{MatchOutcome, MatchRecord, PlayerPerspective, RatingDeltas, Side};
pub use season::SeasonWindow;
pub use sides::{GlobalSideStatistics, PreferredSide, SideRecord, SideStatistics};
pub use standings::{HighestMargin, SeasonStatistics, StandingsRow, WinStreak};
pub use stats::PlayerStatistics;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        PlayerId(value.to_string())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl From<&str> for MatchId {
    fn from(value: &str) -> Self {
        MatchId(value.to_string())
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonId(pub String);

impl From<&str> for SeasonId {
    fn from(value: &str) -> Self {
        SeasonId(value.to_string())
    }
}

impl std::fmt::Display for SeasonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    #[error("malformed match record {record_id}: {reason}")]
    MalformedRecord { record_id: String, reason: String },
}

impl LeagueError {
    pub fn malformed(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        LeagueError::MalformedRecord {
            record_id: record_id.into(),
            reason: reason.into(),
        }
    }
}
