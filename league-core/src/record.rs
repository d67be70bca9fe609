use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LeagueError, MatchId, PlayerId};

/// Table side a player occupied during a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "blau")]
    Blue,
    #[serde(alias = "weiss")]
    White,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Blue, Side::White];

    pub fn opposite(&self) -> Side {
        match self {
            Side::Blue => Side::White,
            Side::White => Side::Blue,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Blue => write!(f, "blue"),
            Side::White => write!(f, "white"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDeltas {
    pub player1: i32,
    pub player2: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
}

impl MatchOutcome {
    pub fn from_scores(own: u32, other: u32) -> Self {
        match own.cmp(&other) {
            std::cmp::Ordering::Greater => MatchOutcome::Win,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
            std::cmp::Ordering::Less => MatchOutcome::Loss,
        }
    }

    /// Score fed into the rating model: 1 for a win, 0.5 for a draw, 0 for a loss.
    pub fn actual_score(&self) -> f64 {
        match self {
            MatchOutcome::Win => 1.0,
            MatchOutcome::Draw => 0.5,
            MatchOutcome::Loss => 0.0,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            MatchOutcome::Win => 3,
            MatchOutcome::Draw => 1,
            MatchOutcome::Loss => 0,
        }
    }
}

/// One played match as it sits in the append-only log.
///
/// `rating_deltas` is whatever was computed when the match was submitted. It
/// is kept for auditing only; ratings are always replayed from the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score_player1: u32,
    pub score_player2: u32,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub played_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player1_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player2_side: Option<Side>,
    #[serde(rename = "eloChange", default, skip_serializing_if = "Option::is_none")]
    pub rating_deltas: Option<RatingDeltas>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A match seen from one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerPerspective<'a> {
    pub opponent: &'a PlayerId,
    pub goals_for: u32,
    pub goals_against: u32,
    pub side: Option<Side>,
    pub outcome: MatchOutcome,
    pub is_player1: bool,
}

impl PlayerPerspective<'_> {
    pub fn winning_margin(&self) -> u32 {
        self.goals_for.saturating_sub(self.goals_against)
    }
}

impl MatchRecord {
    pub fn new(
        id: MatchId,
        player1_id: PlayerId,
        player2_id: PlayerId,
        score_player1: u32,
        score_player2: u32,
        played_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            player1_id,
            player2_id,
            score_player1,
            score_player2,
            played_at,
            player1_side: None,
            player2_side: None,
            rating_deltas: None,
            notes: None,
        }
    }

    pub fn with_sides(mut self, player1_side: Side, player2_side: Side) -> Self {
        self.player1_side = Some(player1_side);
        self.player2_side = Some(player2_side);
        self
    }

    pub fn with_rating_deltas(mut self, deltas: RatingDeltas) -> Self {
        self.rating_deltas = Some(deltas);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<(), LeagueError> {
        if self.id.0.is_empty() {
            return Err(LeagueError::malformed("", "empty match id"));
        }
        if self.player1_id == self.player2_id {
            return Err(LeagueError::malformed(
                &self.id.0,
                format!("player {} listed on both sides", self.player1_id),
            ));
        }
        if let (Some(side1), Some(side2)) = (self.player1_side, self.player2_side) {
            if side1 == side2 {
                return Err(LeagueError::malformed(
                    &self.id.0,
                    format!("both players on side {}", side1),
                ));
            }
        }
        Ok(())
    }

    pub fn involves(&self, player_id: &PlayerId) -> bool {
        self.player1_id == *player_id || self.player2_id == *player_id
    }

    pub fn is_draw(&self) -> bool {
        self.score_player1 == self.score_player2
    }

    pub fn goal_margin(&self) -> u32 {
        self.score_player1.abs_diff(self.score_player2)
    }

    pub fn total_goals(&self) -> u64 {
        u64::from(self.score_player1) + u64::from(self.score_player2)
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match MatchOutcome::from_scores(self.score_player1, self.score_player2) {
            MatchOutcome::Win => Some(&self.player1_id),
            MatchOutcome::Loss => Some(&self.player2_id),
            MatchOutcome::Draw => None,
        }
    }

    pub fn loser(&self) -> Option<&PlayerId> {
        match MatchOutcome::from_scores(self.score_player1, self.score_player2) {
            MatchOutcome::Win => Some(&self.player2_id),
            MatchOutcome::Loss => Some(&self.player1_id),
            MatchOutcome::Draw => None,
        }
    }

    pub fn score_line(&self) -> String {
        format!("{}-{}", self.score_player1, self.score_player2)
    }

    pub fn perspective(&self, player_id: &PlayerId) -> Option<PlayerPerspective<'_>> {
        if self.player1_id == *player_id {
            Some(PlayerPerspective {
                opponent: &self.player2_id,
                goals_for: self.score_player1,
                goals_against: self.score_player2,
                side: self.player1_side,
                outcome: MatchOutcome::from_scores(self.score_player1, self.score_player2),
                is_player1: true,
            })
        } else if self.player2_id == *player_id {
            Some(PlayerPerspective {
                opponent: &self.player1_id,
                goals_for: self.score_player2,
                goals_against: self.score_player1,
                side: self.player2_side,
                outcome: MatchOutcome::from_scores(self.score_player2, self.score_player1),
                is_player1: false,
            })
        } else {
            None
        }
    }
}
