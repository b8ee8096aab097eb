//! Error types for the game simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid match configuration.
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    /// Base placement could not satisfy the connectivity requirement.
    #[error("Base placement failed after {attempts} attempts: {reason}")]
    PlacementFailed {
        /// Number of full placement attempts made.
        attempts: u32,
        /// Why the last attempt was rejected.
        reason: String,
    },
}
