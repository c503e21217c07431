//! Run configuration.
//!
//! Grid dimensions, GA tuning, and run-level knobs live in one explicit
//! tree that is passed to the maze generator and the planner. All structs
//! deserialize from partial documents; missing fields take their defaults.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::RescueError;
use crate::pool::WorkerPool;

/// Maze and station-placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Side length of the square grid. Must be odd and at least 5.
    pub grid_size: usize,
    /// Number of subgrids along each axis; one station per subgrid.
    pub subgrids_per_dimension: usize,
    /// Extra walls knocked down after carving. `None` = `2 * grid_size`.
    pub walls_to_break: Option<usize>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            grid_size: 101,
            subgrids_per_dimension: 4,
            walls_to_break: None,
        }
    }
}

impl MazeConfig {
    /// Sets the grid side length.
    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.grid_size = size;
        self
    }

    /// Sets the number of subgrids per axis.
    pub fn with_subgrids_per_dimension(mut self, n: usize) -> Self {
        self.subgrids_per_dimension = n;
        self
    }

    /// Sets the number of extra walls to break.
    pub fn with_walls_to_break(mut self, n: usize) -> Self {
        self.walls_to_break = Some(n);
        self
    }

    /// Side length of one subgrid.
    pub fn subgrid_size(&self) -> usize {
        self.grid_size / self.subgrids_per_dimension.max(1)
    }

    /// Subgrids per axis after integer division of the grid.
    pub fn subgrids_per_axis(&self) -> usize {
        match self.subgrid_size() {
            0 => 0,
            s => self.grid_size / s,
        }
    }

    /// Total number of subgrids, i.e. of station slots.
    pub fn subgrid_count(&self) -> usize {
        self.subgrids_per_axis().pow(2)
    }

    /// Effective wall-break count.
    pub fn effective_walls_to_break(&self) -> usize {
        self.walls_to_break.unwrap_or(self.grid_size * 2)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), RescueError> {
        if self.grid_size < 5 || self.grid_size % 2 == 0 {
            return Err(RescueError::InvalidConfig(format!(
                "grid_size must be odd and >= 5, got {}",
                self.grid_size
            )));
        }
        if self.subgrids_per_dimension == 0 || self.subgrids_per_dimension > self.grid_size {
            return Err(RescueError::InvalidConfig(format!(
                "subgrids_per_dimension must be in 1..={}, got {}",
                self.grid_size, self.subgrids_per_dimension
            )));
        }
        Ok(())
    }
}

/// Genetic planner parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Chromosomes per generation.
    pub population_size: usize,
    /// Number of generations to run. There is no early stop.
    pub generations: usize,
    /// Contestants drawn (with replacement) per tournament.
    pub tournament_size: usize,
    /// Probability in percent that a pair exchanges one unit path.
    pub crossover_rate: u32,
    /// Probability in percent that an offspring is mutated.
    pub mutation_rate: u32,
    /// Top chromosomes of the current generation kept unconditionally.
    pub num_elites: usize,
    /// Maximum cumulative steps one unit may travel (inclusive).
    pub unit_step_budget: u32,
    /// Random insertion attempts per chromosome during initialization.
    pub init_insert_attempts: usize,
    /// Longest per-unit stop list the refiner will permute.
    pub max_refine_stops: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            generations: 300,
            tournament_size: 5,
            crossover_rate: 80,
            mutation_rate: 30,
            num_elites: 10,
            unit_step_budget: 180,
            init_insert_attempts: 20,
            max_refine_stops: 8,
        }
    }
}

impl PlannerConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, n: usize) -> Self {
        self.tournament_size = n;
        self
    }

    /// Sets the crossover rate (percent, clamped to 100).
    pub fn with_crossover_rate(mut self, pct: u32) -> Self {
        self.crossover_rate = pct.min(100);
        self
    }

    /// Sets the mutation rate (percent, clamped to 100).
    pub fn with_mutation_rate(mut self, pct: u32) -> Self {
        self.mutation_rate = pct.min(100);
        self
    }

    /// Sets the elite count.
    pub fn with_num_elites(mut self, n: usize) -> Self {
        self.num_elites = n;
        self
    }

    /// Sets the per-unit step budget.
    pub fn with_unit_step_budget(mut self, steps: u32) -> Self {
        self.unit_step_budget = steps;
        self
    }

    /// Sets the initialization insertion attempts.
    pub fn with_init_insert_attempts(mut self, n: usize) -> Self {
        self.init_insert_attempts = n;
        self
    }

    /// Sets the longest stop list the refiner will permute.
    pub fn with_max_refine_stops(mut self, n: usize) -> Self {
        self.max_refine_stops = n;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), RescueError> {
        let fail = |msg: String| Err(RescueError::InvalidConfig(msg));
        if self.population_size < 2 {
            return fail(format!("population_size must be >= 2, got {}", self.population_size));
        }
        if self.num_elites == 0 || self.num_elites >= self.population_size {
            return fail(format!(
                "num_elites must be in 1..{}, got {}",
                self.population_size, self.num_elites
            ));
        }
        if self.tournament_size == 0 {
            return fail("tournament_size must be >= 1".into());
        }
        if self.crossover_rate > 100 || self.mutation_rate > 100 {
            return fail("rates are percentages in 0..=100".into());
        }
        if self.unit_step_budget == 0 {
            return fail("unit_step_budget must be >= 1".into());
        }
        Ok(())
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    /// Maze parameters.
    pub maze: MazeConfig,
    /// Planner parameters.
    pub planner: PlannerConfig,
    /// Fleet size. `None` draws 3..=5 units.
    pub num_units: Option<usize>,
    /// Worker threads. `None` uses the available hardware parallelism.
    pub worker_threads: Option<usize>,
    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl RescueConfig {
    /// Sets the maze parameters.
    pub fn with_maze(mut self, maze: MazeConfig) -> Self {
        self.maze = maze;
        self
    }

    /// Sets the planner parameters.
    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    /// Fixes the fleet size.
    pub fn with_num_units(mut self, n: usize) -> Self {
        self.num_units = Some(n);
        self
    }

    /// Fixes the worker thread count.
    pub fn with_worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = Some(n);
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), RescueError> {
        self.maze.validate()?;
        self.planner.validate()?;
        if self.num_units == Some(0) {
            return Err(RescueError::InvalidConfig("num_units must be >= 1".into()));
        }
        if self.worker_threads == Some(0) {
            return Err(RescueError::InvalidConfig("worker_threads must be >= 1".into()));
        }
        Ok(())
    }

    /// Starts the worker pool: `worker_threads` workers, or one per
    /// hardware thread when unset.
    pub fn worker_pool(&self) -> WorkerPool {
        self.worker_threads
            .map_or_else(WorkerPool::with_available_parallelism, WorkerPool::new)
    }

    /// RNG for this run: seeded when a seed is set, OS entropy otherwise.
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}
