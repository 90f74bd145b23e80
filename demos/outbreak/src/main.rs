//! outbreak — smallest runnable demo for the rust_epi workspace.
//!
//! Simulates an infection spreading through a crowd on a 40×24 grid with two
//! interior walls, decomposed into 4 patches.  Writes per-query statistics
//! and the full trace to `output/`, then prints a closing summary with the
//! final compartment counts.
//!
//! Run with `RUST_LOG=debug` to watch the patch workers start up.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use epi_core::{Point, Rect};
use epi_output::{CsvReportWriter, JsonReportWriter, ReportWriter};
use epi_person::{Compartment, Parameters};
use epi_scenario::{Scenario, ScenarioBuilder};
use epi_sim::{NoopObserver, Sim};
use log::info;

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_WIDTH:  u32 = 40;
const GRID_HEIGHT: u32 = 24;
const CROWD_SIZE:  usize = 120;
const SEED:        u64 = 42;
const TICKS:       u32 = 200;
const PATCHES:     usize = 4;
const PADDING:     u32 = 8;

fn scenario() -> Result<Scenario> {
    let everywhere = Rect::new(Point::new(0, 0), GRID_WIDTH, GRID_HEIGHT);
    let scenario = ScenarioBuilder::new(GRID_WIDTH, GRID_HEIGHT)
        .parameters(Parameters {
            infection_radius: 2,
            incubation_time:  3,
            infectious_time:  12,
        })
        // Two walls with gaps: the infection has to walk around them.
        .obstacle(Rect::new(Point::new(13, 0), 1, 18))
        .obstacle(Rect::new(Point::new(26, 6), 1, 18))
        .query("everywhere", everywhere)
        .query("west-wing", Rect::new(Point::new(0, 0), 13, GRID_HEIGHT))
        .query("east-wing", Rect::new(Point::new(27, 0), 13, GRID_HEIGHT))
        .ticks(TICKS)
        .patches(PATCHES)
        .trace(true)
        .person(
            "index-case",
            Point::new(2, 2),
            Point::new(1, 1),
            Compartment::Infectious,
        )
        .scatter(CROWD_SIZE, SEED)
        .build()?;
    Ok(scenario)
}

fn main() -> Result<()> {
    env_logger::init();

    let scenario = scenario()?;
    let sim = Sim::new(&scenario, PADDING, &NoopObserver)?;
    info!(
        "padding {} supports a synchronisation interval of {} tick(s)",
        PADDING,
        sim.sync_interval()
    );

    let started = Instant::now();
    let report = sim.run()?;
    let elapsed = started.elapsed();

    let out_dir = Path::new("output");
    fs::create_dir_all(out_dir)?;
    let mut csv = CsvReportWriter::new(out_dir)?;
    csv.write(&report)?;
    csv.finish()?;
    let mut json = JsonReportWriter::new(out_dir.join("report.json"))?;
    json.write(&report)?;
    json.finish()?;

    // ── Closing summary ───────────────────────────────────────────────────
    let final_counts = report.statistics["everywhere"]
        .last()
        .copied()
        .unwrap_or_default();
    println!(
        "simulated {} persons for {} ticks on {} patch(es) in {:.2?}",
        scenario.population.len(),
        TICKS,
        PATCHES,
        elapsed
    );
    println!(
        "final state: {} susceptible, {} infected, {} infectious, {} recovered",
        final_counts.susceptible,
        final_counts.infected,
        final_counts.infectious,
        final_counts.recovered
    );
    println!("wrote output/statistics.csv, output/trace.csv, output/report.json");
    Ok(())
}
