//! The influence predicate: can state in one region affect another?
//!
//! Influence travels two ways: persons walk cell-to-cell around obstacles,
//! and infection jumps up to the infection radius straight over them.  Both
//! end on free cells (nobody stands on an obstacle), so reachability over
//! free cells with Manhattan-bounded hops captures exactly the set of region
//! pairs that can affect each other.
//!
//! The hop graph is undirected, which makes the predicate symmetric by
//! construction — the liveness precondition of the channel protocol.

use std::collections::VecDeque;

use epi_core::{Point, Rect};
use epi_scenario::Scenario;

/// Whether influence can propagate from region `a` to region `b` given the
/// scenario's grid and obstacles.
///
/// Multi-source BFS over the free cells of the whole grid: one hop reaches
/// any free cell within Manhattan distance `max(1, infection_radius)` (radius
/// zero still leaves cell-to-cell movement).  Regions with no free cells can
/// neither exert nor receive influence.
pub fn may_influence(scenario: &Scenario, a: &Rect, b: &Rect) -> bool {
    let grid = scenario.grid;
    let hop = scenario.parameters.infection_radius.max(1) as i32;

    let width = grid.width as i32;
    let cell_index = |p: Point| -> usize {
        ((p.y - grid.origin.y) * width + (p.x - grid.origin.x)) as usize
    };

    let mut visited = vec![false; grid.area() as usize];
    let mut queue = VecDeque::new();
    for p in a.cells() {
        if grid.contains(p) && scenario.is_free(p) {
            if b.contains(p) {
                return true;
            }
            visited[cell_index(p)] = true;
            queue.push_back(p);
        }
    }

    while let Some(p) = queue.pop_front() {
        for dx in -hop..=hop {
            let rest = hop - dx.abs();
            for dy in -rest..=rest {
                let next = Point::new(p.x + dx, p.y + dy);
                if !grid.contains(next) || !scenario.is_free(next) {
                    continue;
                }
                let idx = cell_index(next);
                if visited[idx] {
                    continue;
                }
                if b.contains(next) {
                    return true;
                }
                visited[idx] = true;
                queue.push_back(next);
            }
        }
    }
    false
}
