//! SI²R health states and the epidemiological constants that drive them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Compartment ───────────────────────────────────────────────────────────────

/// The public SI²R compartment of a person, without progression counters.
///
/// This is what scenario files declare and what traces report; the internal
/// countdown state lives in [`HealthState`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compartment {
    Susceptible,
    Infected,
    Infectious,
    Recovered,
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compartment::Susceptible => "susceptible",
            Compartment::Infected    => "infected",
            Compartment::Infectious  => "infectious",
            Compartment::Recovered   => "recovered",
        };
        f.write_str(s)
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Epidemiological constants, fixed for a whole run.
///
/// `incubation_time` and `infectious_time` are in ticks and must be ≥ 1;
/// scenario validation rejects anything else.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Parameters {
    /// Maximum Manhattan distance at which an infectious person can infect.
    pub infection_radius: u32,
    /// Ticks spent incubating (`Infected`) before turning `Infectious`.
    pub incubation_time: u32,
    /// Ticks spent `Infectious` before recovering.
    pub infectious_time: u32,
}

// ── HealthState ───────────────────────────────────────────────────────────────

/// The internal health state machine: compartment plus countdown.
///
/// Progression is strictly one-way:
/// `Susceptible → Infected → Infectious → Recovered`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HealthState {
    Susceptible,
    Infected { ticks_until_infectious: u32 },
    Infectious { ticks_until_recovered: u32 },
    Recovered,
}

impl HealthState {
    /// Initial state for a scenario-declared compartment: countdowns start
    /// full, as if the transition into the compartment happened at tick 0.
    pub fn from_compartment(c: Compartment, params: &Parameters) -> Self {
        match c {
            Compartment::Susceptible => HealthState::Susceptible,
            Compartment::Infected => HealthState::Infected {
                ticks_until_infectious: params.incubation_time,
            },
            Compartment::Infectious => HealthState::Infectious {
                ticks_until_recovered: params.infectious_time,
            },
            Compartment::Recovered => HealthState::Recovered,
        }
    }

    pub fn compartment(&self) -> Compartment {
        match self {
            HealthState::Susceptible => Compartment::Susceptible,
            HealthState::Infected { .. } => Compartment::Infected,
            HealthState::Infectious { .. } => Compartment::Infectious,
            HealthState::Recovered => Compartment::Recovered,
        }
    }

    /// Advance the countdown by one tick, transitioning when it runs out.
    pub fn advance(self, params: &Parameters) -> HealthState {
        match self {
            HealthState::Infected { ticks_until_infectious: 1 } => HealthState::Infectious {
                ticks_until_recovered: params.infectious_time,
            },
            HealthState::Infected { ticks_until_infectious } => HealthState::Infected {
                ticks_until_infectious: ticks_until_infectious - 1,
            },
            HealthState::Infectious { ticks_until_recovered: 1 } => HealthState::Recovered,
            HealthState::Infectious { ticks_until_recovered } => HealthState::Infectious {
                ticks_until_recovered: ticks_until_recovered - 1,
            },
            other => other,
        }
    }
}
