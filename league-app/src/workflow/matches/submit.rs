use std::sync::Arc;

use chrono::{DateTime, Utc};
use league_core::{BASELINE_RATING, MatchId, MatchRecord, PlayerId, RatingModel, Side};

use crate::{domain::matches::MatchRepository, services::league_state::LeagueStateService};

#[derive(Clone, Debug)]
pub struct SubmitMatchCommand {
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub score1: u32,
    pub score2: u32,
    pub played_at: Option<DateTime<Utc>>,
    pub side1: Option<Side>,
    pub side2: Option<Side>,
    pub notes: Option<String>,
}

impl SubmitMatchCommand {
    pub fn new(player1: PlayerId, player2: PlayerId, score1: u32, score2: u32) -> Self {
        Self {
            player1,
            player2,
            score1,
            score2,
            played_at: None,
            side1: None,
            side2: None,
            notes: None,
        }
    }
}

#[async_trait::async_trait]
pub trait SubmitMatchUseCase {
    async fn submit_match(&self, command: SubmitMatchCommand)
    -> Result<MatchRecord, SubmitMatchError>;
}

#[derive(Debug)]
pub enum SubmitMatchError {
    UnknownPlayerReference(PlayerId),
    InvalidMatch(String),
    Internal,
}

pub struct SubmitMatchUseCaseImpl<M: MatchRepository, L: LeagueStateService> {
    match_repository: Arc<M>,
    league_state_service: Arc<L>,
    rating_model: RatingModel,
}

impl<M: MatchRepository, L: LeagueStateService> SubmitMatchUseCaseImpl<M, L> {
    pub fn new(match_repository: Arc<M>, league_state_service: Arc<L>) -> Self {
        Self {
            match_repository,
            league_state_service,
            rating_model: RatingModel::default(),
        }
    }

    /// Sides default to blue for the first player. A single given side fixes
    /// the other one.
    fn resolve_sides(side1: Option<Side>, side2: Option<Side>) -> (Side, Side) {
        match (side1, side2) {
            (Some(side1), Some(side2)) => (side1, side2),
            (Some(side1), None) => (side1, side1.opposite()),
            (None, Some(side2)) => (side2.opposite(), side2),
            (None, None) => (Side::Blue, Side::White),
        }
    }
}

#[async_trait::async_trait]
impl<M, L> SubmitMatchUseCase for SubmitMatchUseCaseImpl<M, L>
where
    M: MatchRepository + Send + Sync + 'static,
    L: LeagueStateService + Send + Sync + 'static,
{
    async fn submit_match(
        &self,
        command: SubmitMatchCommand,
    ) -> Result<MatchRecord, SubmitMatchError> {
        let directory = self
            .league_state_service
            .player_directory()
            .await
            .map_err(|e| {
                log::error!("Failed to load player metadata: {}", e);
                SubmitMatchError::Internal
            })?;
        for player_id in [&command.player1, &command.player2] {
            if !directory.contains(player_id) {
                return Err(SubmitMatchError::UnknownPlayerReference(player_id.clone()));
            }
        }

        let states = self
            .league_state_service
            .player_states()
            .await
            .map_err(|e| {
                log::error!("Failed to derive player states: {}", e);
                SubmitMatchError::Internal
            })?;
        let rating_of = |player_id: &PlayerId| {
            states
                .get(player_id)
                .map(|state| state.current_rating)
                .unwrap_or(BASELINE_RATING)
        };
        let deltas = self.rating_model.calculate_rating_changes(
            rating_of(&command.player1),
            rating_of(&command.player2),
            command.score1,
            command.score2,
        );

        let (side1, side2) = Self::resolve_sides(command.side1, command.side2);
        let mut record = MatchRecord::new(
            MatchId(uuid::Uuid::now_v7().to_string()),
            command.player1,
            command.player2,
            command.score1,
            command.score2,
            command.played_at.unwrap_or_else(Utc::now),
        )
        .with_sides(side1, side2)
        .with_rating_deltas(deltas);
        if let Some(notes) = command.notes.filter(|n| !n.trim().is_empty()) {
            record = record.with_notes(notes);
        }
        record
            .validate()
            .map_err(|e| SubmitMatchError::InvalidMatch(e.to_string()))?;

        if let Err(e) = self.match_repository.append(record.clone()).await {
            log::error!("Failed to append match {}: {}", record.id, e);
            return Err(SubmitMatchError::Internal);
        }
        self.league_state_service.invalidate();
        log::info!(
            "Recorded match {}: {} {} {}",
            record.id,
            record.player1_id,
            record.score_line(),
            record.player2_id
        );
        Ok(record)
    }
}
