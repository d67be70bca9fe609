use chrono::{DateTime, Utc};
use league_core::Side;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Upper bound on flips per request.
pub const MAX_ROUNDS: u32 = 99;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    #[serde(alias = "kopf")]
    Heads,
    #[serde(alias = "zahl")]
    Tails,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinflipWinner {
    Player1,
    Player2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideAssignment {
    pub player1_side: Side,
    pub player2_side: Side,
}

impl SideAssignment {
    /// The winner plays on `winner_side`, the other player opposite.
    pub fn by_winner_choice(winner: CoinflipWinner, winner_side: Side) -> Self {
        match winner {
            CoinflipWinner::Player1 => Self {
                player1_side: winner_side,
                player2_side: winner_side.opposite(),
            },
            CoinflipWinner::Player2 => Self {
                player1_side: winner_side.opposite(),
                player2_side: winner_side,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinflipOutcome {
    pub flips: Vec<Coin>,
    pub player1_choice: Coin,
    pub winner: CoinflipWinner,
    /// Set when the flip also decided the sides.
    pub sides: Option<SideAssignment>,
    pub flipped_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CoinflipError {
    /// Zero or more than `MAX_ROUNDS` flips.
    InvalidRounds(u32),
    /// A best-of series needs an odd number of flips.
    EvenRounds(u32),
}

pub trait CoinflipUseCase {
    fn flip(&self, rounds: u32) -> Result<Vec<Coin>, CoinflipError>;

    /// Best of `rounds`: player 1 wins when their call matches the majority.
    fn flip_for_winner(
        &self,
        player1_choice: Coin,
        rounds: u32,
    ) -> Result<CoinflipOutcome, CoinflipError>;

    /// Like `flip_for_winner`, and the winner is put on the blue side.
    fn flip_for_sides(
        &self,
        player1_choice: Coin,
        rounds: u32,
    ) -> Result<CoinflipOutcome, CoinflipError>;

    fn assign_sides(&self, winner: CoinflipWinner, winner_side: Side) -> SideAssignment;
}

pub struct CoinflipUseCaseImpl<R: Rng> {
    rng: Mutex<R>,
}

impl CoinflipUseCaseImpl<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for CoinflipUseCaseImpl<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> CoinflipUseCaseImpl<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn check_rounds(rounds: u32) -> Result<(), CoinflipError> {
        if rounds == 0 || rounds > MAX_ROUNDS {
            return Err(CoinflipError::InvalidRounds(rounds));
        }
        Ok(())
    }

    fn best_of(&self, player1_choice: Coin, rounds: u32) -> Result<CoinflipOutcome, CoinflipError> {
        Self::check_rounds(rounds)?;
        if rounds % 2 == 0 {
            return Err(CoinflipError::EvenRounds(rounds));
        }
        let flips = self.flip(rounds)?;
        let matching = flips.iter().filter(|&&coin| coin == player1_choice).count();
        let winner = if matching * 2 > flips.len() {
            CoinflipWinner::Player1
        } else {
            CoinflipWinner::Player2
        };
        Ok(CoinflipOutcome {
            flips,
            player1_choice,
            winner,
            sides: None,
            flipped_at: Utc::now(),
        })
    }
}

impl<R: Rng> CoinflipUseCase for CoinflipUseCaseImpl<R> {
    fn flip(&self, rounds: u32) -> Result<Vec<Coin>, CoinflipError> {
        Self::check_rounds(rounds)?;
        let mut rng = self.rng.lock();
        Ok((0..rounds)
            .map(|_| {
                if rng.random_bool(0.5) {
                    Coin::Heads
                } else {
                    Coin::Tails
                }
            })
            .collect())
    }

    fn flip_for_winner(
        &self,
        player1_choice: Coin,
        rounds: u32,
    ) -> Result<CoinflipOutcome, CoinflipError> {
        let outcome = self.best_of(player1_choice, rounds)?;
        log::debug!("Coinflip won by {:?} after {:?}", outcome.winner, outcome.flips);
        Ok(outcome)
    }

    fn flip_for_sides(
        &self,
        player1_choice: Coin,
        rounds: u32,
    ) -> Result<CoinflipOutcome, CoinflipError> {
        let mut outcome = self.best_of(player1_choice, rounds)?;
        outcome.sides = Some(SideAssignment::by_winner_choice(outcome.winner, Side::Blue));
        Ok(outcome)
    }

    fn assign_sides(&self, winner: CoinflipWinner, winner_side: Side) -> SideAssignment {
        SideAssignment::by_winner_choice(winner, winner_side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> CoinflipUseCaseImpl<StdRng> {
        CoinflipUseCaseImpl::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_same_seed_same_flips() {
        let a = seeded(7).flip(25).unwrap();
        let b = seeded(7).flip(25).unwrap();
        assert_eq!(a.len(), 25);
        assert_eq!(a, b);
        assert!(a.contains(&Coin::Heads));
        assert!(a.contains(&Coin::Tails));
    }

    #[test]
    fn test_round_limits() {
        let coinflip = seeded(1);
        assert_eq!(coinflip.flip(0), Err(CoinflipError::InvalidRounds(0)));
        assert_eq!(
            coinflip.flip(MAX_ROUNDS + 1),
            Err(CoinflipError::InvalidRounds(MAX_ROUNDS + 1))
        );
        assert_eq!(
            coinflip.flip_for_winner(Coin::Heads, 4),
            Err(CoinflipError::EvenRounds(4))
        );
    }

    #[test]
    fn test_best_of_follows_majority() {
        for seed in 0..20 {
            let outcome = seeded(seed).flip_for_winner(Coin::Tails, 5).unwrap();
            let tails = outcome.flips.iter().filter(|&&c| c == Coin::Tails).count();
            let expected = if tails >= 3 {
                CoinflipWinner::Player1
            } else {
                CoinflipWinner::Player2
            };
            assert_eq!(outcome.winner, expected, "seed {}", seed);
            assert_eq!(outcome.sides, None);
        }
    }

    #[test]
    fn test_opposite_calls_have_opposite_winners() {
        let heads = seeded(42).flip_for_winner(Coin::Heads, 3).unwrap();
        let tails = seeded(42).flip_for_winner(Coin::Tails, 3).unwrap();
        assert_eq!(heads.flips, tails.flips);
        assert_ne!(heads.winner, tails.winner);
    }

    #[test]
    fn test_flip_winner_gets_blue() {
        for seed in 0..10 {
            let outcome = seeded(seed).flip_for_sides(Coin::Heads, 1).unwrap();
            let sides = outcome.sides.unwrap();
            let player1_won = outcome.flips[0] == Coin::Heads;
            assert_eq!(outcome.winner == CoinflipWinner::Player1, player1_won);
            assert_eq!(sides.player1_side == Side::Blue, player1_won);
            assert_eq!(sides.player2_side, sides.player1_side.opposite());
        }
    }

    #[test]
    fn test_winner_picks_side() {
        let coinflip = seeded(3);
        assert_eq!(
            coinflip.assign_sides(CoinflipWinner::Player2, Side::White),
            SideAssignment {
                player1_side: Side::Blue,
                player2_side: Side::White,
            }
        );
        assert_eq!(
            coinflip.assign_sides(CoinflipWinner::Player1, Side::White),
            SideAssignment {
                player1_side: Side::White,
                player2_side: Side::Blue,
            }
        );
    }

    #[test]
    fn test_legacy_call_spelling() {
        let coin: Coin = serde_json::from_str("\"kopf\"").unwrap();
        assert_eq!(coin, Coin::Heads);
    }
}
