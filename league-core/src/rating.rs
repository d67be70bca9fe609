use crate::record::{MatchOutcome, RatingDeltas};

pub const BASELINE_RATING: i32 = 1000;

/// Elo variant where lopsided results move ratings further.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingModel {
    k_factor: f64,
    goal_difference_impact: f64,
    margin_cap: u32,
    scale: f64,
}

impl Default for RatingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingModel {
    const K_FACTOR: f64 = 32.0;
    const GOAL_DIFFERENCE_IMPACT: f64 = 0.1;
    const MARGIN_CAP: u32 = 10;
    const EXPECTED_SCORE_SCALE: f64 = 400.0;

    pub fn new() -> Self {
        Self {
            k_factor: Self::K_FACTOR,
            goal_difference_impact: Self::GOAL_DIFFERENCE_IMPACT,
            margin_cap: Self::MARGIN_CAP,
            scale: Self::EXPECTED_SCORE_SCALE,
        }
    }

    pub fn expected_score(&self, rating: i32, opponent_rating: i32) -> f64 {
        1.0 / (1.0 + 10f64.powf(f64::from(opponent_rating - rating) / self.scale))
    }

    /// K grows by 10% per goal of margin beyond the first, capped at a 10 goal margin.
    pub fn k_factor(&self, goal_difference: u32, is_draw: bool) -> f64 {
        if is_draw || goal_difference <= 1 {
            return self.k_factor;
        }
        let margin = goal_difference.min(self.margin_cap) - 1;
        self.k_factor * (1.0 + f64::from(margin) * self.goal_difference_impact)
    }

    pub fn rating_delta(
        &self,
        rating: i32,
        opponent_rating: i32,
        actual_score: f64,
        goal_difference: u32,
        is_draw: bool,
    ) -> i32 {
        let k = self.k_factor(goal_difference, is_draw);
        let expected = self.expected_score(rating, opponent_rating);
        (k * (actual_score - expected)).round() as i32
    }

    /// Deltas for both players of one match, each from its own point of view.
    pub fn calculate_rating_changes(
        &self,
        rating_player1: i32,
        rating_player2: i32,
        score_player1: u32,
        score_player2: u32,
    ) -> RatingDeltas {
        let goal_difference = score_player1.abs_diff(score_player2);
        let is_draw = score_player1 == score_player2;
        let outcome1 = MatchOutcome::from_scores(score_player1, score_player2);
        let outcome2 = MatchOutcome::from_scores(score_player2, score_player1);
        RatingDeltas {
            player1: self.rating_delta(
                rating_player1,
                rating_player2,
                outcome1.actual_score(),
                goal_difference,
                is_draw,
            ),
            player2: self.rating_delta(
                rating_player2,
                rating_player1,
                outcome2.actual_score(),
                goal_difference,
                is_draw,
            ),
        }
    }
}
