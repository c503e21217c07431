//! Station and entrance placement.

use log::{info, warn};
use rand::Rng;

use crate::config::MazeConfig;
use crate::error::RescueError;
use crate::models::{Cell, Grid, HostageStation, Point, StationProfile};

/// Offsets tried around a random subgrid point: the point itself first,
/// then its eight neighbours.
const PROBE_OFFSETS: [(i32, i32); 9] = [
    (0, 0),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn is_free(grid: &Grid, p: Point) -> bool {
    grid.in_interior(p) && grid.get(p) == Some(Cell::Path)
}

/// Draws the random parameters of a newly placed station.
pub fn random_profile<R: Rng>(rng: &mut R) -> StationProfile {
    StationProfile {
        hostage_chance: f64::from(rng.random_range(0..=100u32)) / 100.0,
        hostage_count: rng.random_range(1..=10),
        kidnapper_chance: f64::from(rng.random_range(0..=70u32)) / 100.0,
        soldier_loss_chance: f64::from(rng.random_range(0..=40u32)) / 100.0,
    }
}

/// Finds a free path cell in one subgrid.
///
/// Tries a random point and its eight neighbours, then scans the whole
/// subgrid row by row starting from that point and wrapping around.
pub fn find_station_cell<R: Rng>(
    grid: &Grid,
    subgrid: usize,
    config: &MazeConfig,
    rng: &mut R,
) -> Option<Point> {
    let size = config.subgrid_size();
    let per_axis = config.subgrids_per_axis();
    if size == 0 || per_axis == 0 {
        return None;
    }

    let origin_x = ((subgrid % per_axis) * size) as i32;
    let origin_y = ((subgrid / per_axis) * size) as i32;
    let local_x = rng.random_range(0..size);
    let local_y = rng.random_range(0..size);
    let probe = Point::new(origin_x + local_x as i32, origin_y + local_y as i32);

    if let Some(p) = PROBE_OFFSETS
        .iter()
        .map(|&(dx, dy)| probe.offset(dx, dy))
        .find(|&p| is_free(grid, p))
    {
        return Some(p);
    }

    let area = size * size;
    let start = local_y * size + local_x;
    (0..area)
        .map(|k| (start + k) % area)
        .map(|idx| Point::new(origin_x + (idx % size) as i32, origin_y + (idx / size) as i32))
        .find(|&p| is_free(grid, p))
}

/// Places one station per subgrid and returns the registry.
///
/// The registry is indexed by subgrid. Subgrids without a free cell get an
/// unplaced placeholder.
pub fn place_stations<R: Rng>(
    grid: &mut Grid,
    config: &MazeConfig,
    rng: &mut R,
) -> Vec<HostageStation> {
    let count = config.subgrid_count();
    let mut stations = Vec::with_capacity(count);

    for subgrid in 0..count {
        match find_station_cell(grid, subgrid, config, rng) {
            Some(p) => {
                grid.set(p, Cell::Station);
                stations.push(HostageStation::new(p, subgrid, random_profile(rng)));
            }
            None => {
                warn!("subgrid {subgrid} has no free cell; station left unplaced");
                stations.push(HostageStation::unplaced(subgrid));
            }
        }
    }

    info!(
        "placed {}/{} stations",
        stations.iter().filter(|s| s.is_placed()).count(),
        count
    );
    stations
}

/// Marks the unit entrance on the bottom interior row.
///
/// Scans outward from the horizontal centre, right side first, for the
/// first path cell.
///
/// # Errors
/// [`RescueError::NoEntrance`] when the row has no path cell.
pub fn place_entrance(grid: &mut Grid) -> Result<Point, RescueError> {
    let center = (grid.width() / 2) as i32;
    let row = 1;

    for dx in 0..=center {
        for x in [center + dx, center - dx] {
            let p = Point::new(x, row);
            if grid.get(p) == Some(Cell::Path) {
                grid.set(p, Cell::Entrance);
                return Ok(p);
            }
        }
    }
    Err(RescueError::NoEntrance)
}
