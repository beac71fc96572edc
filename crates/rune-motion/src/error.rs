//! Error types for the motion engine.

use thiserror::Error;

/// Result type for motion engine operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors that can occur when driving animations.
///
/// Only contract violations surface here. Numeric edge cases (empty tracks,
/// zero-width phases, out-of-range progress) resolve to neutral values instead.
#[derive(Error, Debug)]
pub enum MotionError {
    /// `Transition::play` was called with no definition passed or stored.
    #[error("no animation definition supplied or stored")]
    NoDefinition,

    /// An animation definition failed validation.
    #[error("invalid animation definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// An animation definition could not be parsed.
    #[error("failed to parse animation definition: {0}")]
    Parse(#[from] serde_json::Error),
}
