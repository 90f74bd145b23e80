//! Serialisable person projections: scenario input and trace output.

use epi_core::{PersonId, Point};
use serde::{Deserialize, Serialize};

use crate::Compartment;

/// A population entry as declared by a scenario file.
///
/// Seeds carry no id — identity is assigned by position in the population
/// list, which is also the canonical output order for traces.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PersonSeed {
    pub name:        String,
    pub position:    Point,
    /// Movement step per tick; both components must be in {-1, 0, 1}.
    pub direction:   Point,
    pub compartment: Compartment,
}

/// The public snapshot of one person at one tick, as recorded in traces.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PersonInfo {
    pub id:          PersonId,
    pub name:        String,
    pub position:    Point,
    pub direction:   Point,
    pub compartment: Compartment,
}
