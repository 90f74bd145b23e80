//! `epi-sim` — domain-decomposed infection simulation.
//!
//! The grid is split into disjoint rectangular tiles, each advanced
//! concurrently by its own patch worker.  Every patch simulates a padded
//! copy of its tile (the halo) so that local physics sees the same
//! neighborhood it would in a whole-grid run, and patches reconcile their
//! halos through blocking single-slot channels every few ticks:
//!
//! ```text
//! Sim::new      — padding/interval consistency check, population setup
//! Sim::run      — partition grid → build channel matrix → construct patches
//!                 → spawn one thread per patch → join → merge
//!
//! per patch, per tick:
//!   ① person transitions (movement + health countdowns)
//!   ② ghost-marker clearing
//!   ③ all-pairs infection scan (Manhattan radius)
//!   ④ every `sync_interval` ticks: send main-region snapshot to every
//!      neighbor, receive ghost context back, rebuild the working set
//!   ⑤ record main-region statistics/trace
//! ```
//!
//! The synchronisation interval is derived from the padding: it is the
//! largest number of ticks over which worst-case influence propagation
//! (movement plus infection jumps) cannot cross the padding.  A padding too
//! small for even one concurrent tick is rejected at construction — the
//! decomposition must be equivalent to a sequential run or not run at all.
//!
//! | Module         | Contents                                      |
//! |----------------|-----------------------------------------------|
//! | [`channel`]    | `Channel<T>`, `ChannelMatrix`                 |
//! | [`patch`]      | the per-tile worker                           |
//! | [`engine`]     | `Sim`, `sync_interval`, merging               |
//! | [`partition`]  | vertical-stripe grid partitioning             |
//! | [`visibility`] | the obstacle-aware influence predicate        |
//! | [`observer`]   | tick-boundary instrumentation hook            |
//! | [`report`]     | `Counts`, `Report`                            |

pub mod channel;
pub mod engine;
pub mod error;
pub mod observer;
pub mod partition;
pub mod patch;
pub mod report;
pub mod visibility;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use channel::{Channel, ChannelError, ChannelMatrix, ChannelResult};
pub use engine::{Sim, sync_interval};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, Observer};
pub use partition::partition;
pub use patch::Patch;
pub use report::{Counts, Report};
pub use visibility::may_influence;
