//! Error types for epi-scenario.

use epi_core::{Point, Rect};
use thiserror::Error;

/// Errors raised while loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("malformed scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grid {0} must have positive area")]
    EmptyGrid(Rect),

    #[error("{name} must be at least 1 tick")]
    ZeroDuration { name: &'static str },

    #[error("patch count must be at least 1")]
    NoPatches,

    #[error("obstacle {0} extends outside the grid")]
    ObstacleOutsideGrid(Rect),

    #[error("duplicate query name `{0}`")]
    DuplicateQuery(String),

    #[error("person `{name}` starts at {position}, which is outside the grid or on an obstacle")]
    PersonNotFree { name: String, position: Point },

    #[error("person `{name}` has direction {direction}; both components must be -1, 0, or 1")]
    BadDirection { name: String, direction: Point },
}

/// Alias for `Result<T, ScenarioError>`.
pub type ScenarioResult<T> = Result<T, ScenarioError>;
