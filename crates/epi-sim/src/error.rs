//! Error types for epi-sim.

use epi_core::PatchId;
use epi_scenario::ScenarioError;
use thiserror::Error;

use crate::ChannelError;

/// Errors raised while constructing or running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configured padding cannot support even a one-tick synchronisation
    /// interval — running anyway would let influence cross patch boundaries
    /// undetected, so construction refuses.
    #[error(
        "padding {padding} is insufficient: one concurrent tick already needs {required}"
    )]
    InsufficientPadding { padding: u32, required: u64 },

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("grid is {width} columns wide and cannot be split into {patches} patches")]
    GridTooNarrow { width: u32, patches: usize },

    /// A blocking handoff failed mid-round.  Unrecoverable for this run:
    /// there is no retry and no partial-result salvage.
    #[error("coordination fault: {0}")]
    Channel(#[from] ChannelError),

    #[error("patch {patch} panicked during its run")]
    PatchPanicked { patch: PatchId },
}

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
