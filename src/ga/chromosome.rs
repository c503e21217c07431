//! Multi-unit assignment chromosome.
//!
//! # Encoding
//!
//! One stop list per unit. Every list starts with the unit's start
//! location (the shared entrance) followed by the stations it visits, in
//! order. A parallel vector tracks the steps each unit's route consumes.
//!
//! A chromosome is valid when no station appears twice anywhere in it and
//! every unit's route fits the step budget. Operators that could break the
//! budget check it and revert; crossover may introduce duplicates, which
//! evaluation then penalizes.
//!
//! # Reference
//! Golden, Levy & Vohra (1987), "The orienteering problem";
//! Chao, Golden & Wasil (1996), "The team orienteering problem"

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::prelude::IndexedRandom;
use rand::Rng;

use super::PlanningProblem;
use crate::models::{LocationId, Plan, ENTRANCE_ID};

/// Fitness given to infeasible chromosomes. Below every feasible plan,
/// including plans made of negative-value stations.
pub const INVALID_FITNESS: f64 = f64::NEG_INFINITY;

/// Whether a chromosome's fitness reflects its current content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationState {
    /// Fitness is up to date.
    Clean,
    /// Content changed since the last evaluation.
    Dirty,
}

/// Candidate plan: one ordered stop list per unit.
///
/// Higher fitness = better plan (maximization).
#[derive(Debug, Clone)]
pub struct PlanChromosome {
    /// Stop lists, one per unit; index 0 of each is the start location.
    pub unit_paths: Vec<Vec<LocationId>>,
    /// Steps consumed by each unit's route, parallel to `unit_paths`.
    pub unit_steps: Vec<u32>,
    /// Sum of visited station values, or [`INVALID_FITNESS`].
    pub fitness: f64,
    /// Whether the plan respects the budget and has no duplicate stops.
    pub is_valid: bool,
    /// Evaluation state.
    pub state: EvaluationState,
}

impl PlanChromosome {
    /// Creates a chromosome where every unit stands at the entrance.
    pub fn new(num_units: usize) -> Self {
        Self {
            unit_paths: vec![vec![ENTRANCE_ID]; num_units],
            unit_steps: vec![0; num_units],
            fitness: INVALID_FITNESS,
            is_valid: false,
            state: EvaluationState::Dirty,
        }
    }

    /// Number of units.
    pub fn num_units(&self) -> usize {
        self.unit_paths.len()
    }

    /// Stations assigned to `unit` (start location excluded).
    pub fn stops(&self, unit: usize) -> &[LocationId] {
        self.unit_paths
            .get(unit)
            .and_then(|p| p.get(1..))
            .unwrap_or(&[])
    }

    /// Total number of station visits across all units.
    pub fn assigned_count(&self) -> usize {
        (0..self.num_units()).map(|u| self.stops(u).len()).sum()
    }

    /// Every station visited by any unit.
    pub fn used_stations(&self) -> HashSet<LocationId> {
        (0..self.num_units())
            .flat_map(|u| self.stops(u).iter().copied())
            .collect()
    }

    /// Whether any station appears more than once across all units.
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::new();
        (0..self.num_units())
            .flat_map(|u| self.stops(u).iter())
            .any(|id| !seen.insert(*id))
    }

    /// Ranking used by selection and replacement: every valid chromosome
    /// beats every invalid one, then higher fitness wins.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.is_valid
            .cmp(&other.is_valid)
            .then_with(|| self.fitness.total_cmp(&other.fitness))
    }

    /// Whether fitness must be recomputed.
    #[inline]
    pub fn needs_evaluation(&self) -> bool {
        self.state == EvaluationState::Dirty
    }

    /// Flags the content as changed.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.state = EvaluationState::Dirty;
    }

    /// Consumes the chromosome into its plan.
    pub fn into_plan(self) -> Plan {
        self.unit_paths
    }

    /// Appends `station` to `unit` if the leg is reachable and the unit's
    /// total stays within budget. Returns whether it was inserted.
    pub fn try_append(
        &mut self,
        unit: usize,
        station: LocationId,
        problem: &PlanningProblem,
    ) -> bool {
        let Some(&last) = self.unit_paths.get(unit).and_then(|p| p.last()) else {
            return false;
        };
        match problem.leg_cost(last, station) {
            Some(cost) if self.unit_steps[unit] + cost <= problem.unit_step_budget() => {
                self.unit_paths[unit].push(station);
                self.unit_steps[unit] += cost;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    fn units_with_stops(&self, min_stops: usize) -> Vec<usize> {
        (0..self.num_units())
            .filter(|&u| self.stops(u).len() >= min_stops)
            .collect()
    }
}

// ======================== Crossover operators ========================

/// Single-unit exchange crossover.
///
/// Children start as copies of their parents; one randomly chosen unit's
/// entire stop list (and its step tally) is then swapped between them.
/// Both children are marked dirty. Duplicates introduced by the exchange
/// are left for evaluation to penalize.
pub fn unit_exchange_crossover<R: Rng>(
    p1: &PlanChromosome,
    p2: &PlanChromosome,
    rng: &mut R,
) -> (PlanChromosome, PlanChromosome) {
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    let units = c1.num_units().min(c2.num_units());
    if units == 0 {
        return (c1, c2);
    }

    let unit = rng.random_range(0..units);
    std::mem::swap(&mut c1.unit_paths[unit], &mut c2.unit_paths[unit]);
    std::mem::swap(&mut c1.unit_steps[unit], &mut c2.unit_steps[unit]);
    c1.mark_dirty();
    c2.mark_dirty();
    (c1, c2)
}

// ======================== Mutation operators ========================

/// Add mutation: appends a random unused station to a random unit.
///
/// Refused when the station is unreachable from the unit's last stop or
/// the unit would exceed its budget.
pub fn add_mutation<R: Rng>(
    chromosome: &mut PlanChromosome,
    problem: &PlanningProblem,
    rng: &mut R,
) -> bool {
    if chromosome.num_units() == 0 {
        return false;
    }
    let used = chromosome.used_stations();
    let unused: Vec<LocationId> = problem
        .station_ids()
        .iter()
        .copied()
        .filter(|id| !used.contains(id))
        .collect();
    let Some(&station) = unused.choose(rng) else {
        return false;
    };
    let unit = rng.random_range(0..chromosome.num_units());
    chromosome.try_append(unit, station, problem)
}

/// Remove mutation: drops one random stop from a random non-empty unit.
pub fn remove_mutation<R: Rng>(
    chromosome: &mut PlanChromosome,
    problem: &PlanningProblem,
    rng: &mut R,
) -> bool {
    let Some(&unit) = chromosome.units_with_stops(1).choose(rng) else {
        return false;
    };
    let path = &mut chromosome.unit_paths[unit];
    let idx = rng.random_range(1..path.len());
    let removed = path.remove(idx);

    match problem.route_cost(path) {
        Some(steps) => {
            chromosome.unit_steps[unit] = steps;
            chromosome.mark_dirty();
            true
        }
        None => {
            path.insert(idx, removed);
            false
        }
    }
}

/// Intra-unit swap: exchanges two stops of one unit.
///
/// Kept only if the reordered route is reachable, within budget, and
/// duplicate-free; otherwise reverted.
pub fn intra_swap_mutation<R: Rng>(
    chromosome: &mut PlanChromosome,
    problem: &PlanningProblem,
    rng: &mut R,
) -> bool {
    let Some(&unit) = chromosome.units_with_stops(2).choose(rng) else {
        return false;
    };
    let len = chromosome.unit_paths[unit].len();
    let i = rng.random_range(1..len);
    let mut j = rng.random_range(1..len - 1);
    if j >= i {
        j += 1;
    }

    chromosome.unit_paths[unit].swap(i, j);
    let path = &chromosome.unit_paths[unit];
    let mut seen = HashSet::new();
    let distinct = path[1..].iter().all(|id| seen.insert(*id));

    match problem.route_cost(path) {
        Some(steps) if distinct && steps <= problem.unit_step_budget() => {
            chromosome.unit_steps[unit] = steps;
            chromosome.mark_dirty();
            true
        }
        _ => {
            chromosome.unit_paths[unit].swap(i, j);
            false
        }
    }
}

/// Inter-unit swap: exchanges one stop between two different units.
///
/// Both units need at least two stops. Kept only if both routes stay
/// reachable and within budget; otherwise reverted.
pub fn inter_swap_mutation<R: Rng>(
    chromosome: &mut PlanChromosome,
    problem: &PlanningProblem,
    rng: &mut R,
) -> bool {
    let candidates = chromosome.units_with_stops(2);
    if candidates.len() < 2 {
        return false;
    }
    let picked: Vec<usize> = candidates.choose_multiple(rng, 2).copied().collect();
    let (u1, u2) = (picked[0], picked[1]);
    let i = rng.random_range(1..chromosome.unit_paths[u1].len());
    let j = rng.random_range(1..chromosome.unit_paths[u2].len());

    let swap = |ch: &mut PlanChromosome| {
        let a = ch.unit_paths[u1][i];
        ch.unit_paths[u1][i] = ch.unit_paths[u2][j];
        ch.unit_paths[u2][j] = a;
    };
    swap(chromosome);

    let budget = problem.unit_step_budget();
    let steps1 = problem.route_cost(&chromosome.unit_paths[u1]);
    let steps2 = problem.route_cost(&chromosome.unit_paths[u2]);
    match (steps1, steps2) {
        (Some(s1), Some(s2)) if s1 <= budget && s2 <= budget => {
            chromosome.unit_steps[u1] = s1;
            chromosome.unit_steps[u2] = s2;
            chromosome.mark_dirty();
            true
        }
        _ => {
            swap(chromosome);
            false
        }
    }
}
