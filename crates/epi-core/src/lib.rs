//! `epi-core` — foundational types for the `rust_epi` simulation workspace.
//!
//! This crate is a dependency of every other `epi-*` crate.  It intentionally
//! has no `epi-*` dependencies and only one external one (`serde`, for the
//! scenario and trace formats).
//!
//! # What lives here
//!
//! | Module   | Contents                                  |
//! |----------|-------------------------------------------|
//! | [`ids`]  | `PersonId`, `PatchId`                     |
//! | [`geom`] | `Point`, half-open `Rect`, cell iteration |

pub mod geom;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geom::{Point, Rect};
pub use ids::{PatchId, PersonId};
