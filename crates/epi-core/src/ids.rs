//! Strongly typed, zero-cost identifier wrappers.
//!
//! Both IDs are `Copy + Ord + Hash` so they can be used as map keys and sort
//! keys without ceremony.  The inner integer is `pub` for direct indexing
//! into per-id `Vec`s via `id.0 as usize`; callers should prefer the
//! `.index()` helper for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }
    };
}

typed_id! {
    /// Identity of a person, stable for the whole run.  Assigned by position
    /// in the scenario's population list, so sorting by `PersonId` recovers
    /// the original population order.
    pub struct PersonId(u32);
}

typed_id! {
    /// Identity of a patch worker.  Equals the patch's position in the
    /// ordered tile sequence produced by partitioning, and doubles as the
    /// row/column index into the channel matrix.
    pub struct PatchId(u32);
}
