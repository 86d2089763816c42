//! Error types
//!
//! None of these are fatal: every caller degrades (offline board, default
//! record, prompt for a name) and keeps the game running.

use thiserror::Error;

/// A single leaderboard request failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network unreachable, CORS, aborted request...
    #[error("network error: {0}")]
    Network(String),
    /// Server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Leaderboard operation failed after recovery was attempted
#[derive(Debug, Error)]
pub enum RankingError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed leaderboard response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("leaderboard returned no entries")]
    Empty,
    /// Every submission transport failed; carries the last failure
    #[error("score submission failed after {attempts} attempts: {last}")]
    Exhausted { attempts: usize, last: TransportError },
}

/// A round could not be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("please enter your name before starting")]
    EmptyName,
}

/// Key-value store failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write failed for {key}")]
    Write { key: String },
}
