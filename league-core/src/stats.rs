use serde::Serialize;

use crate::record::MatchOutcome;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub goals_scored: u64,
    pub goals_conceded: u64,
}

impl PlayerStatistics {
    pub fn record(&mut self, outcome: MatchOutcome, goals_for: u32, goals_against: u32) {
        self.matches_played += 1;
        self.goals_scored += u64::from(goals_for);
        self.goals_conceded += u64::from(goals_against);
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Draw => self.draws += 1,
            MatchOutcome::Loss => self.losses += 1,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_scored as i64 - self.goals_conceded as i64
    }

    /// Percentage of matches won, 0 when nothing was played.
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        f64::from(self.wins) * 100.0 / f64::from(self.matches_played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut stats = PlayerStatistics::default();
        stats.record(MatchOutcome::Win, 10, 3);
        stats.record(MatchOutcome::Draw, 2, 2);
        stats.record(MatchOutcome::Loss, 1, 6);
        assert_eq!(stats.matches_played, 3);
        assert_eq!((stats.wins, stats.draws, stats.losses), (1, 1, 1));
        assert_eq!(stats.goals_scored, 13);
        assert_eq!(stats.goals_conceded, 11);
        assert_eq!(stats.goal_difference(), 2);
    }

    #[test]
    fn test_win_rate_without_matches() {
        assert_eq!(PlayerStatistics::default().win_rate(), 0.0);
    }
}
