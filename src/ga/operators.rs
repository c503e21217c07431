//! Probabilistic genetic operators for rescue plans.
//!
//! [`GeneticOperators`] decides *whether* crossover and mutation fire and
//! *which* mutation runs; the operators themselves live in the chromosome
//! module.
//!
//! # Usage
//!
//! ```
//! use u_rescue::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_rate, 80);
//! assert_eq!(ops.mutation_rate, 30);
//! ```

use rand::Rng;

use super::chromosome::{
    add_mutation, inter_swap_mutation, intra_swap_mutation, remove_mutation,
    unit_exchange_crossover, PlanChromosome,
};
use super::problem::PlanningProblem;
use crate::config::PlannerConfig;

/// Mutation operator applied to an offspring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    /// Append a random unused station to a random unit.
    Add,
    /// Drop a random stop from a random non-empty unit.
    Remove,
    /// Swap two stops inside one unit.
    IntraUnitSwap,
    /// Swap one stop between two units.
    InterUnitSwap,
}

impl MutationType {
    /// All mutation types, drawn uniformly.
    pub const ALL: [MutationType; 4] = [
        MutationType::Add,
        MutationType::Remove,
        MutationType::IntraUnitSwap,
        MutationType::InterUnitSwap,
    ];
}

/// Crossover and mutation probabilities, in percent.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Chance (0..=100) that a pair exchanges one unit path.
    pub crossover_rate: u32,
    /// Chance (0..=100) that an offspring is mutated.
    pub mutation_rate: u32,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl GeneticOperators {
    /// Takes the rates from a planner configuration.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
        }
    }

    fn fires<R: Rng>(rate: u32, rng: &mut R) -> bool {
        rng.random_bool(f64::from(rate.min(100)) / 100.0)
    }

    /// Produces two offspring.
    ///
    /// With `crossover_rate` percent probability one unit's path is
    /// exchanged; otherwise the offspring are copies that keep their
    /// parents' evaluation state.
    pub fn crossover<R: Rng>(
        &self,
        p1: &PlanChromosome,
        p2: &PlanChromosome,
        rng: &mut R,
    ) -> (PlanChromosome, PlanChromosome) {
        if Self::fires(self.crossover_rate, rng) {
            unit_exchange_crossover(p1, p2, rng)
        } else {
            (p1.clone(), p2.clone())
        }
    }

    /// With `mutation_rate` percent probability applies one uniformly
    /// chosen mutation.
    ///
    /// Returns the operator that changed the chromosome, or `None` when no
    /// mutation fired or the chosen one was refused.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut PlanChromosome,
        problem: &PlanningProblem,
        rng: &mut R,
    ) -> Option<MutationType> {
        if !Self::fires(self.mutation_rate, rng) {
            return None;
        }
        let kind = MutationType::ALL[rng.random_range(0..MutationType::ALL.len())];
        Self::apply(kind, chromosome, problem, rng).then_some(kind)
    }

    /// Applies a specific mutation. Returns whether it changed anything.
    pub fn apply<R: Rng>(
        kind: MutationType,
        chromosome: &mut PlanChromosome,
        problem: &PlanningProblem,
        rng: &mut R,
    ) -> bool {
        match kind {
            MutationType::Add => add_mutation(chromosome, problem, rng),
            MutationType::Remove => remove_mutation(chromosome, problem, rng),
            MutationType::IntraUnitSwap => intra_swap_mutation(chromosome, problem, rng),
            MutationType::InterUnitSwap => inter_swap_mutation(chromosome, problem, rng),
        }
    }
}
