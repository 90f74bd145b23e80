//! Result types: per-query statistics series and the optional trace.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use epi_person::{Compartment, PersonInfo};
use serde::{Deserialize, Serialize};

// ── Counts ────────────────────────────────────────────────────────────────────

/// Population counts by compartment for one query region at one tick.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Counts {
    pub susceptible: u64,
    pub infected:    u64,
    pub infectious:  u64,
    pub recovered:   u64,
}

impl Counts {
    /// Count one person in its compartment.
    pub fn tally(&mut self, compartment: Compartment) {
        match compartment {
            Compartment::Susceptible => self.susceptible += 1,
            Compartment::Infected    => self.infected += 1,
            Compartment::Infectious  => self.infectious += 1,
            Compartment::Recovered   => self.recovered += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.susceptible + self.infected + self.infectious + self.recovered
    }
}

impl AddAssign for Counts {
    /// Element-wise sum — merging is safe across patches because main
    /// regions are disjoint and every series is main-region-scoped.
    fn add_assign(&mut self, rhs: Counts) {
        self.susceptible += rhs.susceptible;
        self.infected += rhs.infected;
        self.infectious += rhs.infectious;
        self.recovered += rhs.recovered;
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// The output of a run (or, internally, of a single patch before merging).
///
/// `statistics[query][tick]` holds the counts for one named query at one
/// tick; every series has `ticks + 1` entries because tick 0 records the
/// initial state.  `trace[tick]` lists every person's public snapshot in
/// original population order, and is empty when tracing is disabled.
#[derive(Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Report {
    pub statistics: BTreeMap<String, Vec<Counts>>,
    pub trace:      Vec<Vec<PersonInfo>>,
}
