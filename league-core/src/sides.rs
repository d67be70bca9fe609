use serde::Serialize;

use crate::{
    PlayerId,
    record::{MatchOutcome, MatchRecord, Side},
};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A player's results on one table side.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRecord {
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_scored: u64,
    pub goals_conceded: u64,
    pub win_rate: f64,
    pub avg_goals_scored: f64,
    pub avg_goals_conceded: f64,
}

impl SideRecord {
    fn record(&mut self, outcome: MatchOutcome, goals_for: u32, goals_against: u32) {
        self.matches_played += 1;
        self.goals_scored += u64::from(goals_for);
        self.goals_conceded += u64::from(goals_against);
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Draw => self.draws += 1,
            MatchOutcome::Loss => self.losses += 1,
        }
        let played = f64::from(self.matches_played);
        self.win_rate = round1(f64::from(self.wins) * 100.0 / played);
        self.avg_goals_scored = round1(self.goals_scored as f64 / played);
        self.avg_goals_conceded = round1(self.goals_conceded as f64 / played);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferredSide {
    pub side: Side,
    /// Win rate lead over the other side, in percentage points.
    pub advantage: f64,
    pub win_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SideStatistics {
    pub blue: SideRecord,
    pub white: SideRecord,
}

impl SideStatistics {
    /// Matches without a recorded side for the player are skipped.
    pub fn for_player<'a, I>(player_id: &PlayerId, matches: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut stats = Self::default();
        for record in matches {
            let Some(view) = record.perspective(player_id) else {
                continue;
            };
            let Some(side) = view.side else {
                continue;
            };
            stats
                .side_mut(side)
                .record(view.outcome, view.goals_for, view.goals_against);
        }
        stats
    }

    pub fn side(&self, side: Side) -> &SideRecord {
        match side {
            Side::Blue => &self.blue,
            Side::White => &self.white,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideRecord {
        match side {
            Side::Blue => &mut self.blue,
            Side::White => &mut self.white,
        }
    }

    pub fn preferred_side(&self) -> Option<PreferredSide> {
        let (better, worse) = if self.blue.win_rate > self.white.win_rate {
            (Side::Blue, Side::White)
        } else if self.white.win_rate > self.blue.win_rate {
            (Side::White, Side::Blue)
        } else {
            return None;
        };
        let win_rate = self.side(better).win_rate;
        Some(PreferredSide {
            side: better,
            advantage: round1(win_rate - self.side(worse).win_rate),
            win_rate,
        })
    }
}

/// Which side won, over every match with both sides recorded.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSideStatistics {
    pub matches_with_sides: u32,
    pub blue_wins: u32,
    pub white_wins: u32,
    pub draws: u32,
    pub blue_goals: u64,
    pub white_goals: u64,
    pub blue_win_rate: f64,
    pub white_win_rate: f64,
}

impl GlobalSideStatistics {
    pub fn from_matches<'a, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut stats = Self::default();
        for record in matches {
            let (Some(side1), Some(_)) = (record.player1_side, record.player2_side) else {
                continue;
            };
            stats.matches_with_sides += 1;
            let (blue_goals, white_goals) = match side1 {
                Side::Blue => (record.score_player1, record.score_player2),
                Side::White => (record.score_player2, record.score_player1),
            };
            stats.blue_goals += u64::from(blue_goals);
            stats.white_goals += u64::from(white_goals);
            match MatchOutcome::from_scores(blue_goals, white_goals) {
                MatchOutcome::Win => stats.blue_wins += 1,
                MatchOutcome::Loss => stats.white_wins += 1,
                MatchOutcome::Draw => stats.draws += 1,
            }
        }
        if stats.matches_with_sides > 0 {
            let total = f64::from(stats.matches_with_sides);
            stats.blue_win_rate = round1(f64::from(stats.blue_wins) * 100.0 / total);
            stats.white_win_rate = round1(f64::from(stats.white_wins) * 100.0 / total);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::MatchId;

    fn game(n: i64, s1: u32, s2: u32, side1: Side) -> MatchRecord {
        MatchRecord::new(
            MatchId(format!("m{}", n)),
            PlayerId::from("anna"),
            PlayerId::from("ben"),
            s1,
            s2,
            Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap() + TimeDelta::hours(n),
        )
        .with_sides(side1, side1.opposite())
    }

    #[test]
    fn test_player_side_split() {
        let matches = vec![
            game(1, 10, 5, Side::Blue),
            game(2, 10, 8, Side::Blue),
            game(3, 3, 10, Side::White),
            game(4, 10, 9, Side::White),
            game(5, 4, 4, Side::White),
        ];
        let stats = SideStatistics::for_player(&PlayerId::from("anna"), &matches);
        assert_eq!(stats.blue.matches_played, 2);
        assert_eq!(stats.blue.win_rate, 100.0);
        assert_eq!(stats.white.matches_played, 3);
        assert_eq!((stats.white.wins, stats.white.draws, stats.white.losses), (1, 1, 1));
        assert_eq!(stats.white.win_rate, 33.3);
        assert_eq!(stats.white.avg_goals_scored, 5.7);

        let preferred = stats.preferred_side().unwrap();
        assert_eq!(preferred.side, Side::Blue);
        assert_eq!(preferred.advantage, 66.7);

        let ben = SideStatistics::for_player(&PlayerId::from("ben"), &matches);
        assert_eq!(ben.white.matches_played, 2);
        assert_eq!(ben.white.wins, 0);
    }

    #[test]
    fn test_matches_without_sides_are_skipped() {
        let mut m = game(1, 10, 5, Side::Blue);
        m.player1_side = None;
        m.player2_side = None;
        let stats = SideStatistics::for_player(&PlayerId::from("anna"), [&m]);
        assert_eq!(stats, SideStatistics::default());
        assert!(stats.preferred_side().is_none());
        assert_eq!(GlobalSideStatistics::from_matches([&m]).matches_with_sides, 0);
    }

    #[test]
    fn test_global_side_wins() {
        let matches = vec![
            game(1, 10, 5, Side::Blue),
            game(2, 10, 8, Side::White),
            game(3, 3, 10, Side::White),
            game(4, 6, 6, Side::Blue),
        ];
        let stats = GlobalSideStatistics::from_matches(&matches);
        assert_eq!(stats.matches_with_sides, 4);
        assert_eq!(stats.blue_wins, 2);
        assert_eq!(stats.white_wins, 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.blue_goals, 10 + 8 + 10 + 6);
        assert_eq!(stats.blue_win_rate, 50.0);
    }
}
