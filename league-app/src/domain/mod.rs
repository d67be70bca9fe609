use league_core::LeagueError;
use thiserror::Error;

pub mod matches;
pub mod players;
pub mod seasons;

#[derive(Debug)]
pub enum RepoError {
    StorageError(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum RepoRetrieveError {
    NotFound,
    StorageError(String),
}

impl std::fmt::Display for RepoRetrieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoRetrieveError::NotFound => write!(f, "Resource not found"),
            RepoRetrieveError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

/// Why derived league state could not be produced. Never retried and never
/// answered from an older cache entry.
#[derive(Debug, Clone, Error)]
pub enum DerivationError {
    #[error(transparent)]
    MalformedRecord(#[from] LeagueError),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<RepoRetrieveError> for DerivationError {
    fn from(value: RepoRetrieveError) -> Self {
        DerivationError::StoreUnavailable(value.to_string())
    }
}
