//! Error type for the collaborators around the simulation
//!
//! The simulation itself never fails; only storage and leaderboard access do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No storage backend (private browsing, no window, ...)
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The backend refused a read or write
    #[error("storage access failed for key `{key}`: {reason}")]
    Storage { key: String, reason: String },

    #[error("invalid stored number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid player name")]
    InvalidPlayerName,
}

pub type Result<T> = std::result::Result<T, Error>;
