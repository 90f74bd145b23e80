//! Observation hook invoked at tick boundaries.

use epi_core::{PatchId, PersonId};

/// Callbacks invoked by every patch worker at the defined instrumentation
/// points: once per simulated tick per patch, and once per simulated tick per
/// person, before that person's state transition.
///
/// Implementations are observation-only — they receive no mutable access and
/// must not try to alter simulation state through interior channels.  Because
/// patches run on their own threads, the hooks take `&self` and the trait
/// requires `Send + Sync`; implementations that accumulate data should use
/// atomics or a mutex.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait Observer: Send + Sync {
    /// Called at the start of each tick of each patch's local loop.
    fn on_patch_tick(&self, _tick: u32, _patch: PatchId) {}

    /// Called for every local person (ghosts included) before its per-tick
    /// transition runs.
    fn on_person_tick(&self, _tick: u32, _patch: PatchId, _person: PersonId) {}
}

/// An [`Observer`] that does nothing.  Use when you need to run a simulation
/// but don't care about instrumentation.
pub struct NoopObserver;

impl Observer for NoopObserver {}
