//! The `Person` entity and the movement view it ticks against.

use epi_core::{PersonId, Point, Rect};

use crate::{Compartment, HealthState, Parameters, PersonInfo, PersonSeed};

// ── World ─────────────────────────────────────────────────────────────────────

/// A worker's movement view: the region its persons may occupy and the
/// obstacles relevant to it.
///
/// For a patch this is the halo region and the obstacles overlapping it; a
/// single-patch run degenerates to the whole grid and the full obstacle list.
#[derive(Copy, Clone, Debug)]
pub struct World<'a> {
    pub bounds:    Rect,
    pub obstacles: &'a [Rect],
}

impl World<'_> {
    /// Whether a person may stand on `p`: inside the bounds and on no obstacle.
    #[inline]
    pub fn is_free(&self, p: Point) -> bool {
        self.bounds.contains(p) && !self.obstacles.iter().any(|o| o.contains(p))
    }
}

// ── Person ────────────────────────────────────────────────────────────────────

/// One simulated person: identity, position, heading, and health state.
///
/// Persons are owned by exactly one patch at a time.  Crossing a patch
/// boundary always goes through a clone (`Clone` or [`ghosted`][Person::ghosted]),
/// never a shared reference.
#[derive(Clone, Debug)]
pub struct Person {
    id:        PersonId,
    name:      String,
    position:  Point,
    direction: Point,
    state:     HealthState,
    /// Set on copies received from a neighboring patch; cleared by the owner
    /// after the next tick's person updates.
    ghost:     bool,
}

impl Person {
    /// Materialise a person from scenario data.
    pub fn from_seed(id: PersonId, seed: &PersonSeed, params: &Parameters) -> Self {
        Self {
            id,
            name:      seed.name.clone(),
            position:  seed.position,
            direction: seed.direction,
            state:     HealthState::from_compartment(seed.compartment, params),
            ghost:     false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Point {
        self.direction
    }

    pub fn compartment(&self) -> Compartment {
        self.state.compartment()
    }

    // ── Role predicates ───────────────────────────────────────────────────

    #[inline]
    pub fn is_susceptible(&self) -> bool {
        matches!(self.state, HealthState::Susceptible)
    }

    #[inline]
    pub fn is_infected(&self) -> bool {
        matches!(self.state, HealthState::Infected { .. })
    }

    #[inline]
    pub fn is_infectious(&self) -> bool {
        matches!(self.state, HealthState::Infectious { .. })
    }

    #[inline]
    pub fn is_recovered(&self) -> bool {
        matches!(self.state, HealthState::Recovered)
    }

    /// Symptomatic persons cough.  Only the infectious ones transmit — the
    /// transmission rule requires infectious ∧ coughing on the source side.
    #[inline]
    pub fn is_coughing(&self) -> bool {
        self.is_infected() || self.is_infectious()
    }

    /// Everyone breathes every tick.  Kept as a distinct role because the
    /// transmission rule composes it with susceptibility on the target side.
    #[inline]
    pub fn is_breathing(&self) -> bool {
        true
    }

    #[inline]
    pub fn is_ghost(&self) -> bool {
        self.ghost
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// One simulated step: advance the health countdown, then move.
    ///
    /// Movement tries one step along `direction`; when blocked by the world
    /// bounds or an obstacle it deflects, trying the horizontal flip, the
    /// vertical flip, then the full reversal.  The first free candidate wins
    /// and its direction sticks.  If all four are blocked the person stays
    /// put with its direction reversed.
    pub fn tick(&mut self, world: &World<'_>, params: &Parameters) {
        self.state = self.state.advance(params);

        let Point { x: dx, y: dy } = self.direction;
        if dx == 0 && dy == 0 {
            return;
        }
        for (cx, cy) in [(dx, dy), (-dx, dy), (dx, -dy), (-dx, -dy)] {
            let candidate = self.position.offset(Point::new(cx, cy));
            if world.is_free(candidate) {
                self.position = candidate;
                self.direction = Point::new(cx, cy);
                return;
            }
        }
        self.direction = Point::new(-dx, -dy);
    }

    /// Expose this person to the infection: susceptible persons start
    /// incubating, everyone else is unaffected.
    pub fn infect(&mut self, params: &Parameters) {
        if self.is_susceptible() {
            self.state = HealthState::Infected {
                ticks_until_infectious: params.incubation_time,
            };
        }
    }

    /// Mark this person as a ghost — a copy living in a patch's halo purely
    /// as cross-boundary context.  Takes ownership because a ghost always
    /// enters a patch as a fresh copy, never as a shared instance.
    pub fn into_ghost(mut self) -> Person {
        self.ghost = true;
        self
    }

    /// Clear the ghost marker: a copy received last round is now plain local
    /// bookkeeping (it may be retransmitted or become authoritative if it
    /// walks into the owner's main region).
    #[inline]
    pub fn clear_ghost(&mut self) {
        self.ghost = false;
    }

    /// Public projection for traces.
    pub fn info(&self) -> PersonInfo {
        PersonInfo {
            id:          self.id,
            name:        self.name.clone(),
            position:    self.position,
            direction:   self.direction,
            compartment: self.compartment(),
        }
    }
}
