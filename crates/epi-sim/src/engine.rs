//! The orchestrator: padding check, partitioning, fork/join, and merging.

use std::collections::BTreeMap;
use std::thread;

use epi_core::{PatchId, PersonId};
use epi_person::{Parameters, Person, PersonInfo};
use epi_scenario::Scenario;
use log::info;
use rustc_hash::FxHashMap;

use crate::partition::partition;
use crate::{ChannelMatrix, Counts, Observer, Patch, Report, SimError, SimResult};

// ── Synchronisation interval ──────────────────────────────────────────────────

/// The largest interval `s ≥ 1` such that worst-case influence propagation
/// over `s` ticks stays within `padding`.
///
/// After `s` ticks, information can have travelled at most
/// `2·s + infection_radius · ceil(s / incubation_time)` cells of Manhattan
/// distance: `2` per tick of movement (a diagonal step), plus one infection
/// jump of up to the radius each time a freshly infected person can have
/// turned infectious.  As long as that reach is at most the padding, nothing
/// outside a patch's halo can affect its main region between two
/// synchronisation rounds — which is what makes the decomposition equivalent
/// to a sequential whole-grid run.
///
/// Fails with [`SimError::InsufficientPadding`] when even `s = 1` exceeds
/// the padding.  `incubation_time` must be ≥ 1 (scenario validation
/// guarantees it).
pub fn sync_interval(padding: u32, params: &Parameters) -> SimResult<u32> {
    let reach = |s: u64| 2 * s + params.infection_radius as u64 * s.div_ceil(params.incubation_time as u64);

    if reach(1) > padding as u64 {
        return Err(SimError::InsufficientPadding { padding, required: reach(1) });
    }
    // The reach is strictly increasing in `s`, so walk up until it no longer fits.
    let mut s: u64 = 1;
    while reach(s + 1) <= padding as u64 {
        s += 1;
    }
    Ok(s as u32)
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// A configured simulation run: the grid split into patches, each advanced
/// on its own thread and reconciled through the channel matrix.
///
/// Construction performs every check that must precede a run — scenario
/// validity and the padding/interval consistency bound — so a constructed
/// `Sim` always runs with a sound decomposition.
///
/// # Example
///
/// ```rust,ignore
/// let sim = Sim::new(&scenario, 8, &NoopObserver)?;
/// let report = sim.run()?;
/// ```
pub struct Sim<'a> {
    scenario:      &'a Scenario,
    observer:      &'a dyn Observer,
    padding:       u32,
    sync_interval: u32,
    /// The shared initial population; patches clone their halo's share.
    population:    Vec<Person>,
}

impl<'a> Sim<'a> {
    /// Validate the scenario, compute the synchronisation interval for
    /// `padding`, and materialise the initial population.
    pub fn new(
        scenario: &'a Scenario,
        padding:  u32,
        observer: &'a dyn Observer,
    ) -> SimResult<Self> {
        scenario.validate()?;
        let sync_interval = sync_interval(padding, &scenario.parameters)?;

        let population = scenario
            .population
            .iter()
            .enumerate()
            .map(|(i, seed)| Person::from_seed(PersonId(i as u32), seed, &scenario.parameters))
            .collect();

        Ok(Self { scenario, observer, padding, sync_interval, population })
    }

    /// Ticks between boundary-exchange rounds for this run.
    pub fn sync_interval(&self) -> u32 {
        self.sync_interval
    }

    /// Run the simulation to the scenario's tick count and merge the
    /// per-patch outputs into one report.
    ///
    /// All patches are constructed sequentially, then started together and
    /// joined at the end — fork/join at the outer level, with the pairwise
    /// channel synchronisation happening inside the patch loops.
    pub fn run(self) -> SimResult<Report> {
        let tiles = partition(self.scenario.grid, self.scenario.patch_count)?;
        let channels = ChannelMatrix::new(tiles.len());

        let patches: Vec<Patch<'_>> = (0..tiles.len())
            .map(|i| {
                Patch::new(
                    self.scenario,
                    self.observer,
                    PatchId(i as u32),
                    &tiles,
                    self.padding,
                    &channels,
                    self.sync_interval,
                    &self.population,
                )
            })
            .collect();

        info!(
            "running {} patch(es) over {} for {} ticks, exchanging every {}",
            tiles.len(),
            self.scenario.grid,
            self.scenario.ticks,
            self.sync_interval
        );

        let results: Vec<SimResult<Report>> = thread::scope(|scope| {
            let handles: Vec<_> = patches
                .into_iter()
                .map(|patch| scope.spawn(move || patch.run()))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(i, handle)| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(SimError::PatchPanicked { patch: PatchId(i as u32) }),
                })
                .collect()
        });

        let mut reports = Vec::with_capacity(results.len());
        for result in results {
            reports.push(result?);
        }

        Ok(self.merge(reports))
    }

    // ── Merging ───────────────────────────────────────────────────────────

    /// Combine per-patch outputs into a single report.
    ///
    /// Statistics sum element-wise per query per tick.  Trace entries are
    /// reassembled per tick through an id-indexed map and emitted in the
    /// original population order; by the disjointness invariant every person
    /// appears in exactly one patch's entry per tick.
    fn merge(&self, mut reports: Vec<Report>) -> Report {
        let entries = self.scenario.ticks as usize + 1;

        let mut statistics: BTreeMap<String, Vec<Counts>> = self
            .scenario
            .queries
            .iter()
            .map(|q| (q.name.clone(), vec![Counts::default(); entries]))
            .collect();
        for report in &reports {
            for (name, series) in &report.statistics {
                if let Some(merged) = statistics.get_mut(name) {
                    for (total, counts) in merged.iter_mut().zip(series) {
                        *total += *counts;
                    }
                }
            }
        }

        let mut trace = Vec::new();
        if self.scenario.trace {
            trace.reserve_exact(entries);
            for tick in 0..entries {
                let mut by_id: FxHashMap<PersonId, PersonInfo> = FxHashMap::default();
                for report in &mut reports {
                    by_id.extend(report.trace[tick].drain(..).map(|info| (info.id, info)));
                }
                let entry: Vec<PersonInfo> = self
                    .population
                    .iter()
                    .filter_map(|p| by_id.remove(&p.id()))
                    .collect();
                debug_assert_eq!(
                    entry.len(),
                    self.population.len(),
                    "every person must be traced by exactly one patch at tick {tick}"
                );
                trace.push(entry);
            }
        }

        Report { statistics, trace }
    }
}
