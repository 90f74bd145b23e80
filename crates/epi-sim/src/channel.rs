//! Single-slot blocking handoff channels and the patch-to-patch matrix.

use std::sync::{Condvar, Mutex};

use epi_core::PatchId;
use epi_person::Person;
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A channel operation failed because the peer thread crashed while holding
/// the slot lock.  There is no retry path: a poisoned handoff means the
/// synchronisation round can never complete.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("handoff slot poisoned by a crashed peer")]
    Poisoned,
}

/// Alias for `Result<T, ChannelError>`.
pub type ChannelResult<T> = Result<T, ChannelError>;

// ── Channel ───────────────────────────────────────────────────────────────────

/// A one-directional, single-slot, blocking handoff between exactly one
/// producer and one consumer.
///
/// [`send`][Channel::send] blocks until the slot is empty, deposits the
/// value, and wakes the receiver; [`recv`][Channel::recv] blocks until a
/// value is present, takes it, and wakes the sender.  Sends and receives on
/// one channel therefore strictly alternate — two sends without an
/// intervening receive park the producer until the consumer catches up.
///
/// There is deliberately no timeout and no cancellation: the simulation runs
/// to a fixed tick count, and every deposited value is consumed in the same
/// synchronisation round it was produced.
pub struct Channel<T> {
    slot:    Mutex<Option<T>>,
    changed: Condvar,
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self {
            slot:    Mutex::new(None),
            changed: Condvar::new(),
        }
    }

    /// Deposit `value`, blocking while the previous one is unconsumed.
    pub fn send(&self, value: T) -> ChannelResult<()> {
        let mut slot = self.slot.lock().map_err(|_| ChannelError::Poisoned)?;
        while slot.is_some() {
            slot = self.changed.wait(slot).map_err(|_| ChannelError::Poisoned)?;
        }
        *slot = Some(value);
        self.changed.notify_all();
        Ok(())
    }

    /// Take the deposited value, blocking until one is present.
    pub fn recv(&self) -> ChannelResult<T> {
        let mut slot = self.slot.lock().map_err(|_| ChannelError::Poisoned)?;
        loop {
            if let Some(value) = slot.take() {
                self.changed.notify_all();
                return Ok(value);
            }
            slot = self.changed.wait(slot).map_err(|_| ChannelError::Poisoned)?;
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── ChannelMatrix ─────────────────────────────────────────────────────────────

/// All patch-to-patch handoffs for one run: an `n × n` table where cell
/// `(from, to)` carries population snapshots from patch `from` to patch `to`.
///
/// The matrix is built once, before any worker starts, and only ever read
/// afterwards — workers index into it through a shared reference, so no
/// synchronisation on the table itself is needed.  Channels for non-neighbor
/// pairs (and the diagonal) exist but simply go unused.
pub struct ChannelMatrix {
    channels: Vec<Channel<Vec<Person>>>,
    patches:  usize,
}

impl ChannelMatrix {
    pub fn new(patches: usize) -> Self {
        Self {
            channels: (0..patches * patches).map(|_| Channel::new()).collect(),
            patches,
        }
    }

    pub fn patch_count(&self) -> usize {
        self.patches
    }

    /// The channel carrying snapshots from `from` to `to`.
    #[inline]
    pub fn between(&self, from: PatchId, to: PatchId) -> &Channel<Vec<Person>> {
        &self.channels[from.index() * self.patches + to.index()]
    }
}
