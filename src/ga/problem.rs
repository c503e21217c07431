//! Rescue planning problem definition.
//!
//! Bridges the precomputed path store and the station registry to the
//! genetic planner: leg costs, station values, random initialization and
//! fitness evaluation.
//!
//! # Reference
//! Vansteenwegen, Souffriau & Van Oudheusden (2011), "The orienteering
//! problem: A survey"

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::Rng;

use super::chromosome::{EvaluationState, PlanChromosome, INVALID_FITNESS};
use crate::models::{
    station_value, HostageStation, ImportantPoint, LocationId, PathStore, Plan, ENTRANCE_ID,
};

/// Multi-unit station assignment problem.
///
/// Cheap to share between worker threads: the path store sits behind an
/// `Arc` and everything else is small.
#[derive(Debug, Clone)]
pub struct PlanningProblem {
    paths: Arc<PathStore>,
    station_ids: Vec<LocationId>,
    values: HashMap<LocationId, f64>,
    num_units: usize,
    unit_step_budget: u32,
}

impl PlanningProblem {
    /// Creates a problem over the given important points.
    ///
    /// Every point except the entrance is a candidate station; its value
    /// comes from the station registry.
    pub fn new(
        paths: Arc<PathStore>,
        points: &[ImportantPoint],
        stations: &[HostageStation],
        num_units: usize,
        unit_step_budget: u32,
    ) -> Self {
        let mut station_ids: Vec<LocationId> = points
            .iter()
            .map(|p| p.id)
            .filter(|&id| id != ENTRANCE_ID)
            .collect();
        station_ids.sort_unstable();
        station_ids.dedup();

        let values = station_ids
            .iter()
            .map(|&id| (id, station_value(stations, id)))
            .collect();

        Self {
            paths,
            station_ids,
            values,
            num_units,
            unit_step_budget,
        }
    }

    /// Candidate station ids, ascending.
    pub fn station_ids(&self) -> &[LocationId] {
        &self.station_ids
    }

    /// Number of units.
    pub fn num_units(&self) -> usize {
        self.num_units
    }

    /// Inclusive per-unit step budget.
    pub fn unit_step_budget(&self) -> u32 {
        self.unit_step_budget
    }

    /// Shared path store.
    pub fn paths(&self) -> &Arc<PathStore> {
        &self.paths
    }

    /// Steps between two locations; `None` if unreachable.
    #[inline]
    pub fn leg_cost(&self, from: LocationId, to: LocationId) -> Option<u32> {
        self.paths.cost(from, to)
    }

    /// Steps along a whole stop list; `None` if any leg is unreachable.
    #[inline]
    pub fn route_cost(&self, stops: &[LocationId]) -> Option<u32> {
        self.paths.path_distance(stops)
    }

    /// Value of visiting `id`. The entrance and unknown ids are worth 0.
    #[inline]
    pub fn value(&self, id: LocationId) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    /// Sum of station values over every unit's stops.
    pub fn plan_value(&self, plan: &Plan) -> f64 {
        plan.iter()
            .flat_map(|path| path.iter().skip(1))
            .map(|&id| self.value(id))
            .sum()
    }

    /// Builds a random individual.
    ///
    /// Every unit starts at the entrance. Up to `attempts` times, a random
    /// unassigned station is appended to a random unit if the unit stays
    /// within budget. Stops early once every station is assigned.
    pub fn create_individual<R: Rng>(&self, attempts: usize, rng: &mut R) -> PlanChromosome {
        let mut chromosome = PlanChromosome::new(self.num_units);
        if self.num_units == 0 {
            return chromosome;
        }

        let mut unassigned = self.station_ids.clone();
        for _ in 0..attempts {
            if unassigned.is_empty() {
                break;
            }
            let slot = rng.random_range(0..unassigned.len());
            let unit = rng.random_range(0..self.num_units);
            if chromosome.try_append(unit, unassigned[slot], self) {
                unassigned.swap_remove(slot);
            }
        }
        chromosome
    }

    /// Evaluates a chromosome in place and clears its dirty flag.
    ///
    /// Valid iff no station repeats across units and every unit's running
    /// cost stays within budget with all legs reachable. Valid chromosomes
    /// score the sum of their station values; invalid ones score
    /// [`INVALID_FITNESS`]. Step tallies are recomputed as a side effect.
    pub fn evaluate(&self, chromosome: &mut PlanChromosome) {
        let mut seen = HashSet::new();
        let mut valid = true;
        let mut fitness = 0.0;

        for (unit, path) in chromosome.unit_paths.iter().enumerate() {
            let mut steps = 0u32;
            for leg in path.windows(2) {
                match self.leg_cost(leg[0], leg[1]) {
                    Some(cost) => steps += cost,
                    None => valid = false,
                }
            }
            if steps > self.unit_step_budget {
                valid = false;
            }
            for &id in path.iter().skip(1) {
                if !seen.insert(id) {
                    valid = false;
                }
                fitness += self.value(id);
            }
            if let Some(slot) = chromosome.unit_steps.get_mut(unit) {
                *slot = steps;
            }
        }

        chromosome.is_valid = valid;
        chromosome.fitness = if valid { fitness } else { INVALID_FITNESS };
        chromosome.state = EvaluationState::Clean;
    }

    /// Evaluates only when the dirty flag is set.
    pub fn evaluate_if_dirty(&self, chromosome: &mut PlanChromosome) {
        if chromosome.needs_evaluation() {
            self.evaluate(chromosome);
        }
    }
}
