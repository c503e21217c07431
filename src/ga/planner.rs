//! Generational GA driver.
//!
//! Each generation runs select → breed → evaluate → replace on a fixed-size
//! population. Fitness evaluation fans out over the shared [`WorkerPool`]:
//! every dirty chromosome moves into its own job and comes back over a
//! channel, so no chromosome is ever reachable from two threads.

use std::cmp::Ordering;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::Rng;

use super::chromosome::PlanChromosome;
use super::operators::GeneticOperators;
use super::problem::PlanningProblem;
use crate::config::PlannerConfig;
use crate::error::RescueError;
use crate::models::{HostageStation, ImportantPoint, PathStore, Plan};
use crate::pool::WorkerPool;
use crate::validation::validate_planning_input;

/// Summary of one generation after replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Generation index, from 0.
    pub generation: usize,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Mean fitness of the valid chromosomes; NaN when there are none.
    pub mean_fitness: f64,
    /// Number of valid chromosomes.
    pub valid_count: usize,
}

/// Result of a planner run.
#[derive(Debug, Clone)]
pub struct PlannerOutcome {
    /// Fittest chromosome of the final generation.
    pub best: PlanChromosome,
    /// Per-generation statistics, in order.
    pub history: Vec<GenerationStats>,
}

impl PlannerOutcome {
    /// Best fitness after each generation.
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.best_fitness).collect()
    }
}

/// Genetic planner over a [`PlanningProblem`].
pub struct GeneticPlanner {
    problem: Arc<PlanningProblem>,
    config: PlannerConfig,
    operators: GeneticOperators,
}

fn by_fitness_desc(a: &PlanChromosome, b: &PlanChromosome) -> Ordering {
    b.rank_cmp(a)
}

impl GeneticPlanner {
    /// Creates a planner; rates come from `config`.
    pub fn new(problem: Arc<PlanningProblem>, config: PlannerConfig) -> Self {
        let operators = GeneticOperators::from_config(&config);
        Self {
            problem,
            config,
            operators,
        }
    }

    /// Random initial population (unevaluated).
    pub fn initial_population<R: Rng>(&self, rng: &mut R) -> Vec<PlanChromosome> {
        (0..self.config.population_size)
            .map(|_| {
                self.problem
                    .create_individual(self.config.init_insert_attempts, rng)
            })
            .collect()
    }

    /// Evaluates every dirty chromosome on `pool` and waits for all of them.
    ///
    /// Clean chromosomes are passed through untouched. Fails if a job died
    /// before returning its chromosome.
    pub fn evaluate_population(
        &self,
        population: Vec<PlanChromosome>,
        pool: &WorkerPool,
    ) -> Result<Vec<PlanChromosome>, RescueError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut slots: Vec<Option<PlanChromosome>> = Vec::with_capacity(population.len());

        for (idx, mut chromosome) in population.into_iter().enumerate() {
            if !chromosome.needs_evaluation() {
                slots.push(Some(chromosome));
                continue;
            }
            slots.push(None);
            let problem = Arc::clone(&self.problem);
            let tx = tx.clone();
            pool.execute(move || {
                problem.evaluate(&mut chromosome);
                // The receiver outlives every job: it is drained after wait_all.
                let _ = tx.send((idx, chromosome));
            });
        }
        drop(tx);
        pool.wait_all();

        for (idx, chromosome) in rx.try_iter() {
            slots[idx] = Some(chromosome);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| {
                    RescueError::WorkerFailure(format!(
                        "fitness evaluation of chromosome {idx} returned nothing"
                    ))
                })
            })
            .collect()
    }

    /// Tournament selection with replacement; fills a mating pool the size
    /// of the configured population.
    pub fn select<R: Rng>(
        &self,
        population: &[PlanChromosome],
        rng: &mut R,
    ) -> Vec<PlanChromosome> {
        if population.is_empty() {
            return Vec::new();
        }
        let rounds = self.config.tournament_size.max(1);
        (0..self.config.population_size)
            .map(|_| {
                let mut winner = &population[rng.random_range(0..population.len())];
                for _ in 1..rounds {
                    let challenger = &population[rng.random_range(0..population.len())];
                    if challenger.rank_cmp(winner) == Ordering::Greater {
                        winner = challenger;
                    }
                }
                winner.clone()
            })
            .collect()
    }

    /// Pairs mating-pool entries sequentially, applies crossover, then
    /// mutation to every child. An odd trailing entry is copied and mutated.
    pub fn breed<R: Rng>(&self, mating_pool: &[PlanChromosome], rng: &mut R) -> Vec<PlanChromosome> {
        let mut offspring = Vec::with_capacity(mating_pool.len());
        for pair in mating_pool.chunks(2) {
            match pair {
                [a, b] => {
                    let (c1, c2) = self.operators.crossover(a, b, rng);
                    offspring.push(c1);
                    offspring.push(c2);
                }
                [a] => offspring.push(a.clone()),
                _ => {}
            }
        }
        for child in &mut offspring {
            self.operators.mutate(child, &self.problem, rng);
        }
        offspring
    }

    /// Elitist replacement: the best `num_elites` of `current` plus the best
    /// `population_size - num_elites` of `offspring`. Invalid chromosomes
    /// rank below every valid one.
    ///
    /// Both inputs must already be evaluated.
    pub fn replace(
        &self,
        mut current: Vec<PlanChromosome>,
        mut offspring: Vec<PlanChromosome>,
    ) -> Vec<PlanChromosome> {
        let elites = self.config.num_elites.min(self.config.population_size);
        current.sort_by(by_fitness_desc);
        offspring.sort_by(by_fitness_desc);

        current.truncate(elites);
        offspring.truncate(self.config.population_size - elites);
        current.append(&mut offspring);
        current
    }

    /// Runs the configured number of generations.
    pub fn run<R: Rng>(&self, pool: &WorkerPool, rng: &mut R) -> Result<PlannerOutcome, RescueError> {
        let initial = self.initial_population(rng);
        let mut population = self.evaluate_population(initial, pool)?;
        debug!(
            "initial population: best fitness {:.3}",
            best_of(&population).map_or(f64::NAN, |c| c.fitness)
        );

        let mut history = Vec::with_capacity(self.config.generations);
        for generation in 0..self.config.generations {
            let mating_pool = self.select(&population, rng);
            let offspring = self.breed(&mating_pool, rng);
            let offspring = self.evaluate_population(offspring, pool)?;
            population = self.replace(population, offspring);

            let stats = generation_stats(generation, &population);
            debug!(
                "generation {}: best {:.3}, mean {:.3}, valid {}/{}",
                generation,
                stats.best_fitness,
                stats.mean_fitness,
                stats.valid_count,
                population.len()
            );
            history.push(stats);
        }

        let best = population
            .into_iter()
            .max_by(|a, b| a.rank_cmp(b))
            .ok_or_else(|| RescueError::InvalidConfig("population is empty".into()))?;
        info!(
            "planner finished after {} generations: best fitness {:.3} ({} stations assigned)",
            self.config.generations,
            best.fitness,
            best.assigned_count()
        );
        Ok(PlannerOutcome { best, history })
    }
}

fn best_of(population: &[PlanChromosome]) -> Option<&PlanChromosome> {
    population.iter().max_by(|a, b| a.rank_cmp(b))
}

fn generation_stats(generation: usize, population: &[PlanChromosome]) -> GenerationStats {
    let best_fitness = best_of(population).map_or(f64::NAN, |c| c.fitness);
    let valid: Vec<f64> = population
        .iter()
        .filter(|c| c.is_valid)
        .map(|c| c.fitness)
        .collect();
    let mean_fitness = if valid.is_empty() {
        f64::NAN
    } else {
        valid.iter().sum::<f64>() / valid.len() as f64
    };
    GenerationStats {
        generation,
        best_fitness,
        mean_fitness,
        valid_count: valid.len(),
    }
}

/// Plans which stations each unit visits.
///
/// Validates the inputs, runs the GA on `pool` and returns one stop list per
/// unit, each starting at the entrance.
pub fn run_planner<R: Rng>(
    paths: Arc<PathStore>,
    points: &[ImportantPoint],
    num_units: usize,
    stations: &[HostageStation],
    config: &PlannerConfig,
    pool: &WorkerPool,
    rng: &mut R,
) -> Result<Plan, RescueError> {
    config.validate()?;
    validate_planning_input(points, stations, num_units).map_err(RescueError::InvalidInput)?;

    let problem = PlanningProblem::new(paths, points, stations, num_units, config.unit_step_budget);
    let negative = problem
        .station_ids()
        .iter()
        .filter(|&&id| problem.value(id) < 0.0)
        .count();
    if negative > 0 {
        warn!("{negative} candidate stations have a negative value");
    }
    info!(
        "planning {} stations for {} units (budget {} steps)",
        problem.station_ids().len(),
        num_units,
        config.unit_step_budget
    );
    let planner = GeneticPlanner::new(Arc::new(problem), config.clone());
    Ok(planner.run(pool, rng)?.best.into_plan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome::INVALID_FITNESS;
    use crate::ga::test_support::{corridor_problem, line_problem};
    use crate::models::{Grid, Point, StationProfile, ENTRANCE_ID};
    use crate::paths::compute_all_paths;
    use crate::validation::validate_plan;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn small_config() -> PlannerConfig {
        PlannerConfig::default()
            .with_population_size(20)
            .with_generations(15)
            .with_num_elites(2)
    }

    fn evaluated(problem: &PlanningProblem, paths: Plan) -> PlanChromosome {
        let mut ch = PlanChromosome::new(paths.len());
        ch.unit_paths = paths;
        problem.evaluate(&mut ch);
        ch
    }

    #[test]
    fn test_open_room_scenario() {
        let grid = Arc::new(Grid::from_rows(&["  E  ", "     ", "     ", "     ", "  @  "]).unwrap());
        let points = vec![
            ImportantPoint::new(ENTRANCE_ID, Point::new(2, 0)),
            ImportantPoint::new(1, Point::new(2, 4)),
        ];
        let profile = StationProfile {
            hostage_chance: 1.0,
            hostage_count: 3,
            kidnapper_chance: 0.0,
            soldier_loss_chance: 0.0,
        };
        let stations = vec![HostageStation::new(Point::new(2, 4), 0, profile)];
        let pool = WorkerPool::new(2);
        let paths = Arc::new(compute_all_paths(grid, Arc::new(points.clone()), &pool));

        let config = small_config().with_unit_step_budget(4);
        let problem = PlanningProblem::new(Arc::clone(&paths), &points, &stations, 1, 4);
        let planner = GeneticPlanner::new(Arc::new(problem), config.clone());
        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = planner.run(&pool, &mut rng).unwrap();
        assert_eq!(outcome.best.unit_paths, vec![vec![0, 1]]);
        assert_eq!(outcome.best.fitness, 3.0);

        let plan = run_planner(paths, &points, 1, &stations, &config, &pool, &mut rng).unwrap();
        assert_eq!(plan, vec![vec![0, 1]]);
    }

    #[test]
    fn test_far_pair_never_shares_unit() {
        let problem = Arc::new(corridor_problem(&[(0, 0), (1, 4), (2, -4)], &[], 1, 8));
        let pool = WorkerPool::new(2);
        let planner = GeneticPlanner::new(Arc::clone(&problem), small_config());
        let mut rng = SmallRng::seed_from_u64(7);

        let mut population = planner.initial_population(&mut rng);
        for _ in 0..10 {
            population = planner.evaluate_population(population, &pool).unwrap();
            for ch in population.iter().filter(|c| c.is_valid) {
                assert!(!ch.has_duplicates());
                assert!(ch.stops(0).len() <= 1);
            }
            let mating = planner.select(&population, &mut rng);
            population = planner.breed(&mating, &mut rng);
        }
    }

    #[test]
    fn test_valid_chromosomes_respect_budget() {
        let problem = Arc::new(line_problem(2, 6));
        let pool = WorkerPool::new(3);
        let planner = GeneticPlanner::new(Arc::clone(&problem), small_config());
        let mut rng = SmallRng::seed_from_u64(11);
        let population = planner.initial_population(&mut rng);
        let population = planner.evaluate_population(population, &pool).unwrap();
        for ch in population.iter().filter(|c| c.is_valid) {
            assert!(!ch.has_duplicates());
            assert!(ch.unit_steps.iter().all(|&s| s <= 6));
        }
    }

    #[test]
    fn test_evaluate_population_keeps_order() {
        let problem = Arc::new(line_problem(1, 100));
        let pool = WorkerPool::new(4);
        let planner = GeneticPlanner::new(Arc::clone(&problem), small_config());
        let population: Vec<_> = (1..=4)
            .map(|id| {
                let mut ch = PlanChromosome::new(1);
                ch.unit_paths[0].push(id);
                ch
            })
            .collect();
        let evaluated = planner.evaluate_population(population, &pool).unwrap();
        let fitness: Vec<f64> = evaluated.iter().map(|c| c.fitness).collect();
        assert_eq!(fitness, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(evaluated.iter().all(|c| !c.needs_evaluation()));
    }

    #[test]
    fn test_select_prefers_fitter() {
        let problem = line_problem(1, 100);
        let planner = GeneticPlanner::new(
            Arc::new(problem.clone()),
            small_config().with_tournament_size(20),
        );
        let population = vec![
            evaluated(&problem, vec![vec![0, 1]]),
            evaluated(&problem, vec![vec![0, 4]]),
        ];
        let mut rng = SmallRng::seed_from_u64(3);
        let pool = planner.select(&population, &mut rng);
        assert_eq!(pool.len(), 20);
        // 20 draws with replacement from two: the fitter one almost surely wins
        assert!(pool.iter().filter(|c| c.fitness == 4.0).count() >= 19);
    }

    #[test]
    fn test_replace_keeps_elites() {
        let problem = line_problem(1, 100);
        let config = small_config().with_population_size(3).with_num_elites(1);
        let planner = GeneticPlanner::new(Arc::new(problem.clone()), config);
        let current = vec![
            evaluated(&problem, vec![vec![0, 1]]),
            evaluated(&problem, vec![vec![0, 4]]),
            evaluated(&problem, vec![vec![0, 2]]),
        ];
        let mut bad = evaluated(&problem, vec![vec![0, 1]]);
        bad.fitness = INVALID_FITNESS;
        bad.is_valid = false;
        let offspring = vec![
            evaluated(&problem, vec![vec![0, 3]]),
            bad,
            evaluated(&problem, vec![vec![0, 2]]),
        ];

        let next = planner.replace(current, offspring);
        let fitness: Vec<f64> = next.iter().map(|c| c.fitness).collect();
        assert_eq!(fitness, vec![4.0, 3.0, 2.0]);
    }

    /// Entrance at x = 0 and six stations to its right, each worth -0.28.
    fn negative_row() -> (Arc<PathStore>, Vec<ImportantPoint>, Vec<HostageStation>) {
        let grid = Arc::new(Grid::from_rows(&["E@@@@@@"]).unwrap());
        let profile = StationProfile {
            hostage_chance: 0.0,
            hostage_count: 1,
            kidnapper_chance: 0.7,
            soldier_loss_chance: 0.4,
        };
        let mut points = vec![ImportantPoint::new(ENTRANCE_ID, Point::new(0, 0))];
        let mut stations = Vec::new();
        for subgrid in 0..6 {
            let at = Point::new(subgrid as i32 + 1, 0);
            let station = HostageStation::new(at, subgrid, profile);
            points.push(ImportantPoint::new(station.id(), at));
            stations.push(station);
        }
        let pool = WorkerPool::new(2);
        let paths = Arc::new(compute_all_paths(grid, Arc::new(points.clone()), &pool));
        (paths, points, stations)
    }

    #[test]
    fn test_replace_prefers_valid_plan_with_negative_fitness() {
        let (paths, points, stations) = negative_row();
        let problem = PlanningProblem::new(paths, &points, &stations, 2, 100);
        let config = small_config().with_population_size(2).with_num_elites(1);
        let planner = GeneticPlanner::new(Arc::new(problem.clone()), config);

        let heavy = evaluated(&problem, vec![vec![0, 1, 2, 3], vec![0, 4]]);
        assert!(heavy.is_valid);
        assert!(heavy.fitness < -1.0);
        let doubled = evaluated(&problem, vec![vec![0, 1], vec![0, 1]]);
        assert!(!doubled.is_valid);

        let next = planner.replace(vec![doubled.clone(), heavy.clone()], vec![doubled, heavy]);
        assert!(next.iter().all(|c| c.is_valid));
        assert!(next.iter().all(|c| !c.has_duplicates()));
    }

    #[test]
    fn test_select_never_picks_invalid_over_valid() {
        let (paths, points, stations) = negative_row();
        let problem = PlanningProblem::new(paths, &points, &stations, 2, 100);
        let planner = GeneticPlanner::new(
            Arc::new(problem.clone()),
            small_config().with_tournament_size(40),
        );
        let population = vec![
            evaluated(&problem, vec![vec![0, 1, 2, 3, 4, 5], vec![0, 6]]),
            evaluated(&problem, vec![vec![0, 2], vec![0, 2]]),
        ];
        let mut rng = SmallRng::seed_from_u64(8);
        let pool = planner.select(&population, &mut rng);
        // 40 draws from two: the valid plan is drawn at least once
        assert!(pool.iter().all(|c| c.is_valid));
    }

    #[test]
    fn test_run_planner_with_negative_stations_returns_valid_plan() {
        let (paths, points, stations) = negative_row();
        let pool = WorkerPool::new(2);
        let config = PlannerConfig::default()
            .with_population_size(6)
            .with_generations(3)
            .with_crossover_rate(100)
            .with_num_elites(1)
            .with_unit_step_budget(100);
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let plan = run_planner(
                Arc::clone(&paths),
                &points,
                2,
                &stations,
                &config,
                &pool,
                &mut rng,
            )
            .unwrap();
            assert!(
                validate_plan(&plan, &paths, 2, 100).is_ok(),
                "seed {seed}: {plan:?}"
            );
        }
    }

    #[test]
    fn test_fitness_is_monotonic() {
        let problem = Arc::new(line_problem(2, 10));
        let pool = WorkerPool::new(2);
        let planner = GeneticPlanner::new(problem, small_config().with_generations(30));
        let mut rng = SmallRng::seed_from_u64(99);
        let outcome = planner.run(&pool, &mut rng).unwrap();

        let history = outcome.best_fitness_history();
        assert_eq!(history.len(), 30);
        assert!(history.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(outcome.best.fitness, *history.last().unwrap());
        assert!(outcome.best.is_valid);
    }

    #[test]
    fn test_run_planner_plan_is_valid() {
        let problem = line_problem(2, 10);
        let pool = WorkerPool::new(2);
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = GeneticPlanner::new(Arc::new(problem.clone()), small_config())
            .run(&pool, &mut rng)
            .unwrap();
        let plan = outcome.best.into_plan();
        assert!(validate_plan(&plan, problem.paths(), 2, 10).is_ok());
    }

    #[test]
    fn test_run_planner_rejects_bad_input() {
        let pool = WorkerPool::new(1);
        let mut rng = SmallRng::seed_from_u64(1);
        let points = vec![ImportantPoint::new(ENTRANCE_ID, Point::new(0, 0))];
        let err = run_planner(
            Arc::new(PathStore::new()),
            &points,
            0,
            &[],
            &small_config(),
            &pool,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, RescueError::InvalidInput(ref errs) if errs.len() == 2));
    }
}
