//! The `Scenario` model and its JSON loaders.

use std::io::Read;

use epi_core::{Point, Rect};
use epi_person::{Parameters, PersonSeed};
use serde::{Deserialize, Serialize};

use crate::{ScenarioError, ScenarioResult};

// ── Query ─────────────────────────────────────────────────────────────────────

/// A named rectangular region whose per-compartment population counts are
/// reported every tick.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    pub area: Rect,
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Everything one simulation run needs, immutable after loading.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    /// The world grid.  Every person stays inside it for the whole run.
    pub grid: Rect,

    /// Impassable rectangles.  Persons deflect off them; infection jumps
    /// over them if the radius allows.
    #[serde(default)]
    pub obstacles: Vec<Rect>,

    pub parameters: Parameters,

    #[serde(default)]
    pub queries: Vec<Query>,

    /// Number of simulated ticks.  Output series have `ticks + 1` entries
    /// (tick 0 records the initial state).
    pub ticks: u32,

    /// Number of patches the grid is split into.
    #[serde(rename = "patches")]
    pub patch_count: usize,

    /// Whether to record the full per-tick population trace.
    #[serde(default)]
    pub trace: bool,

    pub population: Vec<PersonSeed>,
}

impl Scenario {
    /// Parse and validate a scenario from a JSON string.
    pub fn from_json_str(json: &str) -> ScenarioResult<Scenario> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse and validate a scenario from any reader (e.g. an open file).
    pub fn from_json_reader<R: Read>(reader: R) -> ScenarioResult<Scenario> {
        let scenario: Scenario = serde_json::from_reader(reader)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Whether a person may stand on `p`: inside the grid and on no obstacle.
    pub fn is_free(&self, p: Point) -> bool {
        self.grid.contains(p) && !self.obstacles.iter().any(|o| o.contains(p))
    }

    /// Check every structural invariant the simulation relies on.
    ///
    /// The loaders call this before returning, so a `Scenario` obtained
    /// through them is always valid.
    pub fn validate(&self) -> ScenarioResult<()> {
        if self.grid.is_empty() {
            return Err(ScenarioError::EmptyGrid(self.grid));
        }
        if self.parameters.incubation_time == 0 {
            return Err(ScenarioError::ZeroDuration { name: "incubation_time" });
        }
        if self.parameters.infectious_time == 0 {
            return Err(ScenarioError::ZeroDuration { name: "infectious_time" });
        }
        if self.patch_count == 0 {
            return Err(ScenarioError::NoPatches);
        }
        for obstacle in &self.obstacles {
            if !self.grid.contains_rect(obstacle) {
                return Err(ScenarioError::ObstacleOutsideGrid(*obstacle));
            }
        }
        for (i, query) in self.queries.iter().enumerate() {
            if self.queries[..i].iter().any(|q| q.name == query.name) {
                return Err(ScenarioError::DuplicateQuery(query.name.clone()));
            }
        }
        for seed in &self.population {
            if !self.is_free(seed.position) {
                return Err(ScenarioError::PersonNotFree {
                    name:     seed.name.clone(),
                    position: seed.position,
                });
            }
            let d = seed.direction;
            if d.x.abs() > 1 || d.y.abs() > 1 {
                return Err(ScenarioError::BadDirection {
                    name:      seed.name.clone(),
                    direction: d,
                });
            }
        }
        Ok(())
    }
}
