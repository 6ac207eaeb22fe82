//! Error types for the match simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
///
/// None of these are raised from inside a frame. They come back from
/// player operations that were declined, or from load-time validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No template is registered under this key.
    #[error("Unknown unit template: {0}")]
    UnknownTemplate(String),

    /// Not enough energy to pay for a deployment.
    #[error("Insufficient energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Energy the deployment costs.
        required: u32,
        /// Whole energy currently in the pool.
        available: u32,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or source label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// A template failed validation.
    #[error("Invalid template '{key}': {reason}")]
    InvalidTemplate {
        /// Template key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Match configuration failed validation.
    #[error("Invalid match config: {0}")]
    InvalidConfig(String),

    /// Input value from the host could not be represented.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
