use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    MatchId, PlayerId,
    match_log::MatchLog,
    player::PlayerDirectory,
    record::{MatchOutcome, MatchRecord},
    stats::PlayerStatistics,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub player_id: PlayerId,
    pub name: String,
    pub display_name: String,
    pub matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_scored: u64,
    pub goals_conceded: u64,
    pub goal_difference: i64,
    pub points: u32,
    pub rank: u32,
}

impl StandingsRow {
    fn from_statistics(
        player_id: &PlayerId,
        stats: &PlayerStatistics,
        points: u32,
        directory: &PlayerDirectory,
    ) -> Self {
        Self {
            player_id: player_id.clone(),
            name: directory.name_of(player_id),
            display_name: directory.display_name_of(player_id),
            matches: stats.matches_played,
            wins: stats.wins,
            draws: stats.draws,
            losses: stats.losses,
            goals_scored: stats.goals_scored,
            goals_conceded: stats.goals_conceded,
            goal_difference: stats.goal_difference(),
            points,
            rank: 0,
        }
    }

    fn rank_key(&self) -> (u32, i64, u64) {
        (self.points, self.goal_difference, self.goals_scored)
    }
}

/// Aggregates a table from matches in any order.
///
/// Rows are ordered by points, goal difference and goals scored (all
/// descending), then fewer matches, then name. Rows equal on the first
/// three share a rank and the next group skips ahead ("1, 1, 3").
pub(crate) fn derive_standings<'a, I>(matches: I, directory: &PlayerDirectory) -> Vec<StandingsRow>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut table: HashMap<&PlayerId, (PlayerStatistics, u32)> = HashMap::new();
    for record in matches {
        for player_id in [&record.player1_id, &record.player2_id] {
            let Some(view) = record.perspective(player_id) else {
                continue;
            };
            let (stats, points) = table.entry(player_id).or_default();
            stats.record(view.outcome, view.goals_for, view.goals_against);
            *points += view.outcome.points();
        }
    }

    let mut rows: Vec<StandingsRow> = table
        .into_iter()
        .map(|(player_id, (stats, points))| {
            StandingsRow::from_statistics(player_id, &stats, points, directory)
        })
        .collect();

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference.cmp(&a.goal_difference))
            .then_with(|| b.goals_scored.cmp(&a.goals_scored))
            .then_with(|| a.matches.cmp(&b.matches))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    let mut previous: Option<((u32, i64, u64), u32)> = None;
    for (index, row) in rows.iter_mut().enumerate() {
        let key = row.rank_key();
        row.rank = match previous {
            Some((previous_key, rank)) if previous_key == key => rank,
            _ => index as u32 + 1,
        };
        previous = Some((key, row.rank));
    }
    rows
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestMargin {
    pub match_id: MatchId,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub score: String,
    pub margin: u32,
    pub played_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinStreak {
    pub player_id: PlayerId,
    pub streak: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatistics {
    pub total_matches: usize,
    pub total_goals: u64,
    pub average_goals_per_match: f64,
    pub highest_scoring_margin: Option<HighestMargin>,
    pub longest_win_streak: Option<WinStreak>,
}

pub(crate) fn derive_season_statistics<'a, I>(matches: I) -> SeasonStatistics
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let sorted = MatchLog::chronological(matches);

    let total_goals: u64 = sorted.iter().map(|r| r.total_goals()).sum();
    let average_goals_per_match = if sorted.is_empty() {
        0.0
    } else {
        (total_goals as f64 / sorted.len() as f64 * 10.0).round() / 10.0
    };

    let mut highest: Option<&MatchRecord> = None;
    let mut current: HashMap<&PlayerId, u32> = HashMap::new();
    let mut longest: Option<WinStreak> = None;
    for &record in &sorted {
        if record.goal_margin() > highest.map_or(0, |h| h.goal_margin()) {
            highest = Some(record);
        }
        for player_id in [&record.player1_id, &record.player2_id] {
            let Some(view) = record.perspective(player_id) else {
                continue;
            };
            let streak = current.entry(player_id).or_default();
            if view.outcome == MatchOutcome::Win {
                *streak += 1;
                if *streak > longest.as_ref().map_or(0, |l| l.streak) {
                    longest = Some(WinStreak {
                        player_id: player_id.clone(),
                        streak: *streak,
                    });
                }
            } else {
                *streak = 0;
            }
        }
    }

    let highest_scoring_margin = highest.and_then(|record| {
        Some(HighestMargin {
            match_id: record.id.clone(),
            winner_id: record.winner()?.clone(),
            loser_id: record.loser()?.clone(),
            score: record.score_line(),
            margin: record.goal_margin(),
            played_at: record.played_at,
        })
    });

    SeasonStatistics {
        total_matches: sorted.len(),
        total_goals,
        average_goals_per_match,
        highest_scoring_margin,
        longest_win_streak: longest,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use proptest::prelude::*;

    use super::*;
    use crate::PlayerProfile;

    fn game(n: i64, p1: &str, p2: &str, s1: u32, s2: u32) -> MatchRecord {
        MatchRecord::new(
            MatchId(format!("m{:03}", n)),
            PlayerId::from(p1),
            PlayerId::from(p2),
            s1,
            s2,
            Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap() + TimeDelta::hours(n),
        )
    }

    fn directory(names: &[(&str, &str)]) -> PlayerDirectory {
        names
            .iter()
            .map(|(id, name)| (PlayerId::from(*id), PlayerProfile::new(*name)))
            .collect()
    }

    fn summary(rows: &[StandingsRow]) -> Vec<(&str, u32)> {
        rows.iter().map(|r| (r.player_id.0.as_str(), r.rank)).collect()
    }

    #[test]
    fn test_symmetric_cycle_ties_and_skips_rank() {
        let matches = vec![
            game(1, "a", "b", 5, 0),
            game(2, "b", "c", 5, 0),
            game(3, "c", "a", 5, 0),
            game(4, "d", "e", 0, 0),
        ];
        let dir = directory(&[("a", "Cleo"), ("b", "Adam"), ("c", "Bea"), ("d", "Dora"), ("e", "Emil")]);
        let rows = derive_standings(&matches, &dir);
        assert_eq!(
            summary(&rows),
            vec![("b", 1), ("c", 1), ("a", 1), ("d", 4), ("e", 4)]
        );
        assert!(rows[..3].iter().all(|r| r.points == 3 && r.goal_difference == 0));
        assert_eq!(rows[3].points, 1);
    }

    #[test]
    fn test_uneven_cycle_ranks_by_goal_difference() {
        let matches = vec![
            game(1, "a", "b", 5, 0),
            game(2, "b", "c", 5, 0),
            game(3, "c", "a", 1, 0),
        ];
        let rows = derive_standings(&matches, &PlayerDirectory::new());
        // a: +4, b: 0, c: -4, all on three points.
        assert_eq!(summary(&rows), vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn test_fewer_matches_first_within_shared_rank() {
        let matches = vec![
            game(1, "a", "x", 3, 1),
            game(2, "b", "y", 3, 0),
            game(3, "y", "b", 1, 0),
        ];
        // a and b both sit on 3 points, +2, 3 goals; a needed one match, b two.
        let dir = directory(&[("a", "Zora"), ("b", "Anna")]);
        let rows = derive_standings(&matches, &dir);
        assert_eq!(
            summary(&rows),
            vec![("a", 1), ("b", 1), ("y", 3), ("x", 4)]
        );
        assert_eq!(rows[0].matches, 1);
        assert_eq!(rows[1].matches, 2);
    }

    #[test]
    fn test_row_names_fall_back_to_id() {
        let rows = derive_standings(&[game(1, "a", "ghost", 2, 1)], &directory(&[("a", "Anna")]));
        assert_eq!(rows[0].name, "Anna");
        assert_eq!(rows[1].name, "ghost");
    }

    #[test]
    fn test_season_statistics() {
        let matches = vec![
            game(1, "a", "b", 10, 2),
            game(2, "b", "a", 10, 2),
            game(3, "a", "c", 3, 1),
            game(4, "a", "b", 4, 3),
            game(5, "a", "c", 5, 5),
        ];
        let stats = derive_season_statistics(&matches);
        assert_eq!(stats.total_matches, 5);
        assert_eq!(stats.total_goals, 45);
        assert_eq!(stats.average_goals_per_match, 9.0);
        let highest = stats.highest_scoring_margin.unwrap();
        assert_eq!(highest.match_id, MatchId::from("m001"));
        assert_eq!(highest.winner_id, PlayerId::from("a"));
        assert_eq!(highest.score, "10-2");
        assert_eq!(highest.margin, 8);
        assert_eq!(
            stats.longest_win_streak,
            Some(WinStreak {
                player_id: PlayerId::from("a"),
                streak: 2
            })
        );
    }

    #[test]
    fn test_draw_only_season_has_no_highlights() {
        let stats = derive_season_statistics(&[game(1, "a", "b", 2, 2)]);
        assert_eq!(stats.highest_scoring_margin, None);
        assert_eq!(stats.longest_win_streak, None);
        assert_eq!(stats.average_goals_per_match, 4.0);

        let empty = derive_season_statistics(std::iter::empty());
        assert_eq!(empty.total_matches, 0);
        assert_eq!(empty.average_goals_per_match, 0.0);
    }

    proptest! {
        #[test]
        fn prop_standings_ignore_match_order(
            scores in prop::collection::vec((0usize..4, 0usize..4, 0u32..11, 0u32..11), 1..30)
                .prop_shuffle(),
        ) {
            let players = ["a", "b", "c", "d"];
            let matches: Vec<MatchRecord> = scores
                .iter()
                .enumerate()
                .filter(|(_, (p1, p2, _, _))| p1 != p2)
                .map(|(n, (p1, p2, s1, s2))| game(n as i64, players[*p1], players[*p2], *s1, *s2))
                .collect();
            let mut reversed = matches.clone();
            reversed.reverse();
            let dir = PlayerDirectory::new();
            prop_assert_eq!(derive_standings(&matches, &dir), derive_standings(&reversed, &dir));

            let rows = derive_standings(&matches, &dir);
            for pair in rows.windows(2) {
                prop_assert!(pair[0].rank <= pair[1].rank);
                prop_assert!(pair[0].points >= pair[1].points);
            }
            if let Some(first) = rows.first() {
                prop_assert_eq!(first.rank, 1);
            }
        }
    }
}
