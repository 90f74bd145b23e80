//! Fluent builder for assembling scenarios in code.

use epi_core::{Point, Rect};
use epi_person::{Compartment, Parameters, PersonSeed};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{Query, Scenario, ScenarioResult};

/// Fluent builder for [`Scenario`], used by tests and demo binaries.
///
/// # Example
///
/// ```rust,ignore
/// let scenario = ScenarioBuilder::new(50, 30)
///     .parameters(Parameters { infection_radius: 2, incubation_time: 3, infectious_time: 5 })
///     .obstacle(Rect::new(Point::new(20, 0), 2, 25))
///     .query("everywhere", Rect::new(Point::new(0, 0), 50, 30))
///     .ticks(100)
///     .patches(4)
///     .trace(true)
///     .person("index-case", Point::new(5, 5), Point::new(1, 0), Compartment::Infectious)
///     .scatter(200, 42)
///     .build()?;
/// ```
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    /// Start a scenario on a `width × height` grid anchored at the origin,
    /// with 1-tick durations, one patch, and no population.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scenario: Scenario {
                grid: Rect::new(Point::new(0, 0), width, height),
                obstacles: Vec::new(),
                parameters: Parameters {
                    infection_radius: 1,
                    incubation_time:  1,
                    infectious_time:  1,
                },
                queries:     Vec::new(),
                ticks:       0,
                patch_count: 1,
                trace:       false,
                population:  Vec::new(),
            },
        }
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.scenario.parameters = parameters;
        self
    }

    pub fn obstacle(mut self, area: Rect) -> Self {
        self.scenario.obstacles.push(area);
        self
    }

    pub fn query(mut self, name: &str, area: Rect) -> Self {
        self.scenario.queries.push(Query { name: name.into(), area });
        self
    }

    pub fn ticks(mut self, ticks: u32) -> Self {
        self.scenario.ticks = ticks;
        self
    }

    pub fn patches(mut self, patch_count: usize) -> Self {
        self.scenario.patch_count = patch_count;
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.scenario.trace = trace;
        self
    }

    /// Append one person to the population.
    pub fn person(
        mut self,
        name:        &str,
        position:    Point,
        direction:   Point,
        compartment: Compartment,
    ) -> Self {
        self.scenario.population.push(PersonSeed {
            name: name.into(),
            position,
            direction,
            compartment,
        });
        self
    }

    /// Scatter `count` susceptible persons over free cells, deterministically
    /// from `seed`.  Positions and directions come from a `SmallRng`, so the
    /// same seed always yields the same population.
    pub fn scatter(mut self, count: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = self.scenario.grid;
        let start = self.scenario.population.len();
        for i in 0..count {
            let position = loop {
                let p = Point::new(
                    rng.gen_range(grid.origin.x..grid.bottom_right().x),
                    rng.gen_range(grid.origin.y..grid.bottom_right().y),
                );
                if self.scenario.is_free(p) {
                    break p;
                }
            };
            let direction = Point::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            self.scenario.population.push(PersonSeed {
                name: format!("person-{}", start + i),
                position,
                direction,
                compartment: Compartment::Susceptible,
            });
        }
        self
    }

    /// Validate and return the finished scenario.
    pub fn build(self) -> ScenarioResult<Scenario> {
        self.scenario.validate()?;
        Ok(self.scenario)
    }
}
