//! Shortest-route engine.
//!
//! - [`bfs`]: single-source BFS with parent-pointer reconstruction
//! - [`engine`]: one BFS job per important point on a [`WorkerPool`](crate::pool::WorkerPool)

pub mod bfs;
pub mod engine;

pub use bfs::{search, SearchTree};
pub use engine::{compute_all_paths, routes_from};
