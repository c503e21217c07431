//! GA-based multi-unit rescue planning.
//!
//! Assigns hostage stations to units so that the total value collected is
//! maximal while every unit's route stays within the step budget and no
//! station is visited twice.
//!
//! # Encoding
//!
//! - **Unit paths**: one ordered stop list per unit, starting at the
//!   entrance. A station appears in at most one unit's list.
//! - **Unit steps**: route length per unit, kept parallel to the paths.
//!
//! # Submodules
//!
//! - [`operators`]: Probabilistic crossover and mutation dispatch
//! - [`planner`]: Generational loop with tournament selection, elitism and
//!   pool-parallel fitness evaluation
//!
//! # Reference
//! - Chao, Golden & Wasil (1996), "The team orienteering problem"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

mod chromosome;
pub mod operators;
pub mod planner;
mod problem;

pub use chromosome::{
    add_mutation, inter_swap_mutation, intra_swap_mutation, remove_mutation,
    unit_exchange_crossover, EvaluationState, PlanChromosome, INVALID_FITNESS,
};
pub use planner::{run_planner, GenerationStats, GeneticPlanner, PlannerOutcome};
pub use problem::PlanningProblem;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::PlanningProblem;
    use crate::models::{
        HostageStation, ImportantPoint, LocationId, PathKey, PathStore, Point, StationProfile,
    };

    /// Problem on a straight corridor along `y = 0`.
    ///
    /// `positions` lists `(id, x)`; id 0 is the entrance. Every pair gets a
    /// straight route except those in `missing`. Station `id` is worth `id`.
    pub(crate) fn corridor_problem(
        positions: &[(LocationId, i32)],
        missing: &[(LocationId, LocationId)],
        num_units: usize,
        budget: u32,
    ) -> PlanningProblem {
        let mut store = PathStore::new();
        for (i, &(a, xa)) in positions.iter().enumerate() {
            for &(b, xb) in &positions[i + 1..] {
                let key = PathKey::new(a, b);
                if missing.iter().any(|&(m, n)| PathKey::new(m, n) == key) {
                    continue;
                }
                let (from, to) = if a < b { (xa, xb) } else { (xb, xa) };
                let step = if to >= from { 1 } else { -1 };
                let mut route = Vec::new();
                let mut x = from;
                loop {
                    route.push(Point::new(x, 0));
                    if x == to {
                        break;
                    }
                    x += step;
                }
                store.insert(key, route);
            }
        }

        let max_id = positions.iter().map(|&(id, _)| id).max().unwrap_or(0);
        let mut stations: Vec<HostageStation> = (0..max_id).map(HostageStation::unplaced).collect();
        for &(id, x) in positions.iter().filter(|&&(id, _)| id > 0) {
            let profile = StationProfile {
                hostage_chance: 1.0,
                hostage_count: id as u32,
                kidnapper_chance: 0.0,
                soldier_loss_chance: 0.0,
            };
            stations[id - 1] = HostageStation::new(Point::new(x, 0), id - 1, profile);
        }

        let points: Vec<ImportantPoint> = positions
            .iter()
            .map(|&(id, x)| ImportantPoint::new(id, Point::new(x, 0)))
            .collect();
        PlanningProblem::new(Arc::new(store), &points, &stations, num_units, budget)
    }

    /// Entrance at x = 0 and stations 1..=4 at x = 2, 4, 6, 8.
    pub(crate) fn line_problem(num_units: usize, budget: u32) -> PlanningProblem {
        corridor_problem(&[(0, 0), (1, 2), (2, 4), (3, 6), (4, 8)], &[], num_units, budget)
    }

    /// Two stations 4 steps either side of the entrance, 8 steps apart.
    pub(crate) fn far_pair_problem() -> PlanningProblem {
        corridor_problem(&[(0, 0), (1, 4), (2, -4)], &[], 1, 8)
    }
}
