//! End-to-end rescue mission planning.
//!
//! Wires the phases together: maze generation, important-point
//! collection, concurrent route precomputation, pruning, the genetic
//! planner and per-unit refinement. One [`WorkerPool`](crate::pool::WorkerPool) serves both the
//! route phase and fitness evaluation.
//!
//! # Example
//!
//! ```no_run
//! use u_rescue::config::{MazeConfig, RescueConfig};
//! use u_rescue::mission::Mission;
//!
//! let config = RescueConfig::default()
//!     .with_maze(MazeConfig::default().with_grid_size(41))
//!     .with_num_units(3)
//!     .with_seed(7);
//! let report = Mission::new(config).run().unwrap();
//! println!("{}", report.grid);
//! for (unit, stops) in report.plan.iter().enumerate() {
//!     println!("unit {unit}: {stops:?}");
//! }
//! ```

use std::sync::Arc;

use log::{info, warn};
use rand::Rng;

use crate::config::RescueConfig;
use crate::error::RescueError;
use crate::ga::{GeneticPlanner, PlanningProblem};
use crate::maze::generate_environment;
use crate::models::{
    Grid, HostageStation, ImportantPoint, PathStore, Plan, Point, ENTRANCE_ID,
};
use crate::paths::compute_all_paths;
use crate::refine::refine_plan;
use crate::report::PlanKpi;
use crate::validation::{validate_plan, validate_planning_input};

/// Fleet size drawn when none is configured.
pub const DEFAULT_UNIT_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Entrance plus every placed station worth visiting.
///
/// Stations that failed placement or have a negative value are left out.
pub fn collect_important_points(stations: &[HostageStation], entrance: Point) -> Vec<ImportantPoint> {
    let mut points = vec![ImportantPoint::new(ENTRANCE_ID, entrance)];
    for station in stations {
        let Some(at) = station.location else {
            continue;
        };
        if station.value() < 0.0 {
            continue;
        }
        points.push(ImportantPoint::new(station.id(), at));
    }
    points
}

/// Drops stations without a route from the entrance, or whose one-way
/// distance from the entrance already exceeds `unit_step_budget`.
///
/// # Errors
/// [`RescueError::NoReachableStations`] if only the entrance is left.
pub fn prune_unreachable(
    points: &[ImportantPoint],
    paths: &PathStore,
    unit_step_budget: u32,
) -> Result<Vec<ImportantPoint>, RescueError> {
    let kept: Vec<ImportantPoint> = points
        .iter()
        .copied()
        .filter(|p| {
            if p.id == ENTRANCE_ID {
                return true;
            }
            match paths.cost(ENTRANCE_ID, p.id) {
                Some(cost) if cost <= unit_step_budget => true,
                Some(cost) => {
                    warn!("station {} is {cost} steps away; dropped", p.id);
                    false
                }
                None => {
                    warn!("station {} has no route from the entrance; dropped", p.id);
                    false
                }
            }
        })
        .collect();

    if kept.iter().all(|p| p.id == ENTRANCE_ID) {
        return Err(RescueError::NoReachableStations);
    }
    Ok(kept)
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct MissionReport {
    /// The generated maze.
    pub grid: Grid,
    /// Station registry indexed by subgrid.
    pub stations: Vec<HostageStation>,
    /// Entrance and the stations the planner considered.
    pub important_points: Vec<ImportantPoint>,
    /// Precomputed routes between important points.
    pub paths: Arc<PathStore>,
    /// Number of units planned for.
    pub num_units: usize,
    /// Refined plan: one stop list per unit, starting at the entrance.
    pub plan: Plan,
    /// Plan metrics.
    pub kpi: PlanKpi,
    /// Best fitness after each generation.
    pub best_fitness_history: Vec<f64>,
}

/// A configured planning run.
#[derive(Debug, Clone, Default)]
pub struct Mission {
    config: RescueConfig,
}

impl Mission {
    /// Creates a mission.
    pub fn new(config: RescueConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &RescueConfig {
        &self.config
    }

    /// Runs every phase and returns the report.
    ///
    /// # Errors
    /// Configuration problems, a maze without entrance, no station worth
    /// visiting, or a failed worker task.
    pub fn run(&self) -> Result<MissionReport, RescueError> {
        let config = &self.config;
        config.validate()?;
        let mut rng = config.rng();
        let num_units = config
            .num_units
            .unwrap_or_else(|| rng.random_range(DEFAULT_UNIT_RANGE));

        let env = generate_environment(&config.maze, &mut rng)?;
        let points = collect_important_points(&env.stations, env.entrance);
        if points.len() < 2 {
            return Err(RescueError::NoImportantPoints);
        }

        let pool = config.worker_pool();
        let grid = Arc::new(env.grid);
        let paths = Arc::new(compute_all_paths(
            Arc::clone(&grid),
            Arc::new(points.clone()),
            &pool,
        ));

        let budget = config.planner.unit_step_budget;
        let points = prune_unreachable(&points, &paths, budget)?;
        validate_planning_input(&points, &env.stations, num_units)
            .map_err(RescueError::InvalidInput)?;

        let problem = PlanningProblem::new(Arc::clone(&paths), &points, &env.stations, num_units, budget);
        let candidates = problem.station_ids().to_vec();
        info!(
            "planning {} stations for {} units on {} workers",
            candidates.len(),
            num_units,
            pool.thread_count()
        );
        let outcome = GeneticPlanner::new(Arc::new(problem), config.planner.clone()).run(&pool, &mut rng)?;
        let best_fitness_history = outcome.best_fitness_history();

        let mut plan = outcome.best.into_plan();
        let refined = refine_plan(&mut plan, &paths, config.planner.max_refine_stops);
        info!("refinement shortened {refined} of {num_units} unit routes");
        validate_plan(&plan, &paths, num_units, budget).map_err(RescueError::InvalidInput)?;

        let kpi = PlanKpi::calculate(&plan, &paths, &env.stations, &candidates, budget);
        info!(
            "plan value {:.3}, {} of {} stations assigned",
            kpi.total_value, kpi.stations_assigned, kpi.stations_available
        );

        let grid = Arc::try_unwrap(grid).unwrap_or_else(|shared| (*shared).clone());
        Ok(MissionReport {
            grid,
            stations: env.stations,
            important_points: points,
            paths,
            num_units,
            plan,
            kpi,
            best_fitness_history,
        })
    }
}
