//! Maze rescue planning for the U-Engine ecosystem.
//!
//! Generates a maze with hostage stations, precomputes shortest routes
//! between every pair of important points on a worker pool, and assigns
//! stations to a fleet of units with a genetic algorithm so the total
//! value collected is maximal within a per-unit step budget.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Grid`, `Point`, `LocationId`, `PathKey`,
//!   `HostageStation`, `PathStore`, `Plan`
//! - **`maze`**: Carving, wall breaking, re-skinning, station and entrance
//!   placement
//! - **`pool`**: Fixed-size worker pool with a wait-all barrier
//! - **`paths`**: BFS and concurrent all-pairs route precomputation
//! - **`ga`**: Multi-unit plan chromosome, operators and generational planner
//! - **`refine`**: Exhaustive per-unit stop reordering
//! - **`validation`**: Input and plan integrity checks
//! - **`report`**: Plan value and KPIs
//! - **`mission`**: End-to-end orchestration
//! - **`config`** / **`error`**: Run configuration and error taxonomy
//!
//! # Pipeline
//!
//! ```text
//! generate_environment → collect_important_points → compute_all_paths
//!     → prune_unreachable → run_planner → refine_plan → PlanKpi
//! ```
//!
//! # References
//!
//! - Chao, Golden & Wasil (1996), "The team orienteering problem"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

pub mod config;
pub mod error;
pub mod ga;
pub mod maze;
pub mod mission;
pub mod models;
pub mod paths;
pub mod pool;
pub mod refine;
pub mod report;
pub mod validation;

pub use config::{MazeConfig, PlannerConfig, RescueConfig};
pub use error::RescueError;
pub use mission::{Mission, MissionReport};
