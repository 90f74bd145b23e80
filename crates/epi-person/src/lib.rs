//! `epi-person` — the per-person epidemiological state machine.
//!
//! A [`Person`] is the unit of simulation state: identity, grid position,
//! movement direction, and an SI²R health state with progression counters.
//! Persons are plain owned data — whenever one crosses a patch boundary it is
//! cloned, so no person instance is ever shared between two workers.
//!
//! | Module     | Contents                                        |
//! |------------|-------------------------------------------------|
//! | [`state`]  | `Compartment`, `HealthState`, `Parameters`      |
//! | [`person`] | `Person`, `World` (a worker's movement view)    |
//! | [`info`]   | `PersonSeed` (input), `PersonInfo` (trace output) |

pub mod info;
pub mod person;
pub mod state;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use info::{PersonInfo, PersonSeed};
pub use person::{Person, World};
pub use state::{Compartment, HealthState, Parameters};
