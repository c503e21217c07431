//! Maze and environment generation.
//!
//! Builds the rescue environment in five passes over a [`Grid`]:
//!
//! 1. **Carve**: iterative backtracking from `(1, 1)` → perfect maze
//! 2. **Break**: open mid-segment walls → alternative routes
//! 3. **Re-skin**: directional box-drawing wall glyphs
//! 4. **Stations**: one station per subgrid
//! 5. **Entrance**: first path cell on the bottom interior row

mod generator;
mod placement;
mod walls;

use std::collections::{HashSet, VecDeque};

use log::info;
use rand::Rng;

pub use generator::{break_walls, carve, is_breakable, CARVE_ORIGIN};
pub use placement::{find_station_cell, place_entrance, place_stations, random_profile};
pub use walls::{reskin, wall_pattern, WALL_GLYPH_BY_PATTERN};

use crate::config::MazeConfig;
use crate::error::RescueError;
use crate::models::{Grid, HostageStation, Point};

/// A generated maze together with its station registry and entrance.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The maze. Read-only once generation returns.
    pub grid: Grid,
    /// Station registry indexed by subgrid.
    pub stations: Vec<HostageStation>,
    /// Units' shared entrance cell.
    pub entrance: Point,
}

/// Runs all generation passes on `grid`.
///
/// # Errors
/// [`RescueError::NoEntrance`] if no entrance cell exists; the run must not
/// continue to planning in that case.
pub fn generate_into<R: Rng>(
    grid: &mut Grid,
    config: &MazeConfig,
    rng: &mut R,
) -> Result<(Vec<HostageStation>, Point), RescueError> {
    carve(grid, rng);
    let broken = break_walls(grid, config.effective_walls_to_break(), rng);
    reskin(grid);
    let stations = place_stations(grid, config, rng);
    let entrance = place_entrance(grid)?;

    info!(
        "generated {}x{} maze ({} extra openings), entrance at {}",
        grid.width(),
        grid.height(),
        broken,
        entrance
    );
    Ok((stations, entrance))
}

/// Allocates a grid for `config` and generates the full environment.
///
/// # Errors
/// [`RescueError::InvalidConfig`], [`RescueError::Allocation`], or
/// [`RescueError::NoEntrance`].
pub fn generate_environment<R: Rng>(
    config: &MazeConfig,
    rng: &mut R,
) -> Result<Environment, RescueError> {
    config.validate()?;
    let mut grid = Grid::new(config.grid_size, config.grid_size)?;
    let (stations, entrance) = generate_into(&mut grid, config, rng)?;
    Ok(Environment {
        grid,
        stations,
        entrance,
    })
}

/// Every traversable cell reachable from `start`.
pub fn flood_fill(grid: &Grid, start: Point) -> HashSet<Point> {
    let mut seen = HashSet::new();
    if !grid.is_traversable(start) {
        return seen;
    }
    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(p) = queue.pop_front() {
        for n in p.neighbors() {
            if grid.is_traversable(n) && seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen
}
