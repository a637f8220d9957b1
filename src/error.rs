//! Errors surfaced by the tour state engine.
//!
//! Every kind is recoverable. The engine never turns an error into a
//! user-facing message; `Display` exists for logs and the CLI boundary.

use crate::config::ConfigError;
use crate::model::{StepId, TourId};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("a tour titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("a tour with file '{0}' already exists")]
    DuplicateFile(String),

    #[error("two tours share the id {0}")]
    DuplicateTourId(TourId),

    #[error("tour '{tour}' has two steps with the id {step}")]
    DuplicateStepId { tour: String, step: StepId },

    #[error("invalid tour file name '{0}': expected <name>.tour")]
    InvalidFileName(String),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("tour not found: {0}")]
    NotFound(TourId),

    #[error("step index {index} out of range for tour with {len} steps")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot move step {index} {direction}")]
    CannotMove { index: usize, direction: Direction },

    #[error("tour '{0}' is read-only")]
    ReadOnlyTour(String),

    #[error("mutation attempted while an event is being delivered")]
    ReentrantMutation,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = core::result::Result<T, EngineError>;

/// Which way a step moves in its tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards index 0.
    Up,
    /// Towards the end of the tour.
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}
