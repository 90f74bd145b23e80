//! The `Patch` worker: local physics on a padded tile, reconciled with its
//! neighbors through blocking handoffs.

use std::collections::BTreeMap;

use epi_core::{PatchId, Rect};
use epi_person::{Person, PersonInfo, World};
use epi_scenario::Scenario;
use log::{debug, error};

use crate::visibility::may_influence;
use crate::{ChannelMatrix, Counts, Observer, Report, SimResult};

/// An independently scheduled worker owning one tile of the grid.
///
/// A patch is authoritative for its **main region** (one tile of the
/// partition) and simulates a **halo** — the main region expanded by the
/// padding — so that infection near the tile edge sees the same neighborhood
/// it would in a whole-grid run.  Persons inside the halo but outside the
/// main region are ghosts: read-only context, refreshed from the neighbors
/// every synchronisation round and never reported in this patch's output.
///
/// Construction runs sequentially in the orchestrator before any worker
/// thread starts; [`run`][Patch::run] then executes on the patch's own
/// thread until the scenario's tick count is exhausted.
pub struct Patch<'a> {
    id:            PatchId,
    scenario:      &'a Scenario,
    observer:      &'a dyn Observer,
    channels:      &'a ChannelMatrix,
    sync_interval: u32,

    main:      Rect,
    halo:      Rect,
    /// Obstacles overlapping the halo — all a local person can ever hit.
    obstacles: Vec<Rect>,
    /// Neighbor patch ids, in partition order.  The relation is symmetric:
    /// the influence test is ORed over both directions on top of an already
    /// undirected reachability check, so if this patch lists `j`, patch `j`
    /// lists this one — the liveness precondition of the handoff protocol.
    neighbors: Vec<PatchId>,

    /// The local working set, kept sorted by person id.
    population: Vec<Person>,

    /// Per-query per-tick counts, indexed like `scenario.queries`.
    statistics: Vec<Vec<Counts>>,
    trace:      Vec<Vec<PersonInfo>>,
}

impl<'a> Patch<'a> {
    /// Build the worker for tile `id` of `tiles`.
    ///
    /// Clones every member of the shared initial population whose position
    /// falls inside the halo; halo-only members enter as ghosts.  Records the
    /// tick-0 statistics and trace before returning.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scenario:      &'a Scenario,
        observer:      &'a dyn Observer,
        id:            PatchId,
        tiles:         &[Rect],
        padding:       u32,
        channels:      &'a ChannelMatrix,
        sync_interval: u32,
        population:    &[Person],
    ) -> Self {
        let main = tiles[id.index()];
        let halo = main.expand(padding, &scenario.grid);

        let obstacles: Vec<Rect> = scenario
            .obstacles
            .iter()
            .copied()
            .filter(|o| halo.overlaps(o))
            .collect();

        let neighbors: Vec<PatchId> = tiles
            .iter()
            .enumerate()
            .filter(|&(j, tile)| {
                j != id.index()
                    && halo.overlaps(tile)
                    && (may_influence(scenario, &main, tile)
                        || may_influence(scenario, tile, &main))
            })
            .map(|(j, _)| PatchId(j as u32))
            .collect();

        let population: Vec<Person> = population
            .iter()
            .filter(|p| halo.contains(p.position()))
            .map(|p| {
                let copy = p.clone();
                if main.contains(copy.position()) { copy } else { copy.into_ghost() }
            })
            .collect();

        let entries = scenario.ticks as usize + 1;
        let mut patch = Self {
            id,
            scenario,
            observer,
            channels,
            sync_interval,
            main,
            halo,
            obstacles,
            neighbors,
            population,
            statistics: (0..scenario.queries.len())
                .map(|_| Vec::with_capacity(entries))
                .collect(),
            trace: Vec::new(),
        };
        patch.record();
        patch
    }

    pub fn id(&self) -> PatchId {
        self.id
    }

    pub fn main_region(&self) -> Rect {
        self.main
    }

    pub fn halo_region(&self) -> Rect {
        self.halo
    }

    pub fn neighbors(&self) -> &[PatchId] {
        &self.neighbors
    }

    // ── Run loop ──────────────────────────────────────────────────────────

    /// Advance the local population tick-by-tick, exchanging boundary
    /// snapshots every `sync_interval` ticks, until the scenario's tick
    /// count is reached.  Returns this patch's main-region-scoped output.
    ///
    /// A failed handoff (a neighbor crashed mid-round) is fatal to the run:
    /// it is logged and the loop is abandoned — the protocol has no retry
    /// and no cancellation path.
    pub fn run(mut self) -> SimResult<Report> {
        debug!(
            "patch {}: main {}, halo {}, {} neighbor(s), {} local person(s)",
            self.id,
            self.main,
            self.halo,
            self.neighbors.len(),
            self.population.len()
        );

        for step in 0..self.scenario.ticks {
            self.observer.on_patch_tick(step, self.id);
            self.tick(step);
            if (step + 1) % self.sync_interval == 0 {
                if let Err(fault) = self.exchange() {
                    error!("patch {}: boundary exchange failed: {fault}", self.id);
                    return Err(fault.into());
                }
            }
            self.record();
        }

        let statistics: BTreeMap<String, Vec<Counts>> = self
            .scenario
            .queries
            .iter()
            .zip(self.statistics)
            .map(|(query, series)| (query.name.clone(), series))
            .collect();
        Ok(Report { statistics, trace: self.trace })
    }

    // ── Local physics ─────────────────────────────────────────────────────

    /// One simulated tick: per-person transitions, ghost-marker clearing,
    /// then the all-pairs infection scan.
    fn tick(&mut self, step: u32) {
        let world = World { bounds: self.halo, obstacles: &self.obstacles };
        let params = &self.scenario.parameters;

        for person in &mut self.population {
            self.observer.on_person_tick(step, self.id, person.id());
            person.tick(&world, params);
        }

        // Copies received last round are now plain local bookkeeping — they
        // may be retransmitted or become authoritative this round.
        for person in &mut self.population {
            person.clear_ghost();
        }

        // Spread the infection.  The roles are not symmetric, so both
        // orderings of every unordered pair are checked independently.
        // Infection only ever turns Susceptible into Infected, and Infected
        // does not transmit, so the outcome is independent of scan order.
        for i in 0..self.population.len() {
            let (head, tail) = self.population.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail {
                if a.position().manhattan_dist(b.position()) > params.infection_radius {
                    continue;
                }
                if a.is_infectious() && a.is_coughing() && b.is_susceptible() && b.is_breathing() {
                    b.infect(params);
                }
                if b.is_infectious() && b.is_coughing() && a.is_susceptible() && a.is_breathing() {
                    a.infect(params);
                }
            }
        }
    }

    // ── Boundary exchange ─────────────────────────────────────────────────

    /// One synchronisation round: send a snapshot of the authoritative
    /// population to every neighbor, then rebuild the working set from the
    /// re-derived main-region persons plus the ghosts received back.
    ///
    /// Every patch completes all sends before its first receive.  Slots are
    /// empty at the start of a round (each channel is used exactly once per
    /// round), so sends never block on a cycle and the round always
    /// completes — given the symmetric neighbor relation established at
    /// construction.
    fn exchange(&mut self) -> Result<(), crate::ChannelError> {
        // Outgoing data must never alias the sender's mutable state: one
        // fresh clone of the main-region population per channel.
        let snapshot: Vec<Person> = self
            .population
            .iter()
            .filter(|p| self.main.contains(p.position()))
            .cloned()
            .collect();
        for &to in &self.neighbors {
            self.channels.between(self.id, to).send(snapshot.clone())?;
        }

        // Re-derive the authoritative persons from the working set (moving,
        // not cloning — the snapshots above are already independent copies).
        let mut next: Vec<Person> = std::mem::take(&mut self.population)
            .into_iter()
            .filter(|p| self.main.contains(p.position()))
            .collect();

        // Keep only true ghost context from each arrival: inside the halo
        // but outside the main region, so nothing this patch just sent away
        // gets re-absorbed as authoritative.
        for &from in &self.neighbors {
            let arrivals = self.channels.between(from, self.id).recv()?;
            next.extend(
                arrivals
                    .into_iter()
                    .filter(|p| {
                        self.halo.contains(p.position()) && !self.main.contains(p.position())
                    })
                    .map(Person::into_ghost),
            );
        }

        next.sort_by_key(Person::id);
        self.population = next;
        Ok(())
    }

    // ── Output accumulation ───────────────────────────────────────────────

    /// Record one tick's statistics and (if enabled) trace entry, scoped to
    /// the main region so no person is counted by two patches.
    fn record(&mut self) {
        for (query, series) in self.scenario.queries.iter().zip(&mut self.statistics) {
            let mut counts = Counts::default();
            for person in &self.population {
                let pos = person.position();
                if self.main.contains(pos) && query.area.contains(pos) {
                    counts.tally(person.compartment());
                }
            }
            series.push(counts);
        }

        if self.scenario.trace {
            let mut entry: Vec<_> = self
                .population
                .iter()
                .filter(|p| self.main.contains(p.position()))
                .map(Person::info)
                .collect();
            entry.sort_by_key(|info| info.id);
            self.trace.push(entry);
        }
    }
}
