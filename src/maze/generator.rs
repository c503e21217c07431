//! Maze carving and wall breaking.
//!
//! # Algorithm
//!
//! Iterative backtracking over the odd-coordinate lattice: every carved
//! cell shuffles its four directions, and a neighbour two cells away is
//! entered (knocking down the wall between) while it is still solid.
//! The result is a spanning tree over the lattice: one route between any
//! two cells and no cycles. An explicit stack replaces recursion so large
//! grids cannot overflow the call stack.
//!
//! Wall breaking then opens mid-segment walls to add alternative routes.
//!
//! # Reference
//! Buck (2015), "Mazes for Programmers", Ch. 5 (Recursive Backtracker)

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Cell, Grid, Point, AXIS_OFFSETS};

/// Cell where carving starts.
pub const CARVE_ORIGIN: Point = Point::new(1, 1);

struct Frame {
    cell: Point,
    dirs: [(i32, i32); 4],
    next: usize,
}

impl Frame {
    fn new<R: Rng>(cell: Point, rng: &mut R) -> Self {
        let mut dirs = AXIS_OFFSETS;
        dirs.shuffle(rng);
        Self { cell, dirs, next: 0 }
    }
}

/// Fills the grid with walls and carves a perfect maze from [`CARVE_ORIGIN`].
pub fn carve<R: Rng>(grid: &mut Grid, rng: &mut R) {
    grid.reset();
    if !grid.in_interior(CARVE_ORIGIN) {
        return;
    }

    grid.set(CARVE_ORIGIN, Cell::Path);
    let mut stack = vec![Frame::new(CARVE_ORIGIN, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.dirs.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = frame.dirs[frame.next];
        frame.next += 1;

        let from = frame.cell;
        let target = from.offset(dx * 2, dy * 2);
        if grid.in_interior(target) && grid.is_wall(target) {
            grid.set(from.offset(dx, dy), Cell::Path);
            grid.set(target, Cell::Path);
            stack.push(Frame::new(target, rng));
        }
    }
}

/// Whether the wall at `p` is the middle of a straight wall segment.
///
/// Qualifies when both neighbours on one axis are walls and neither
/// neighbour on the other axis is. Corners, junctions, dead-end stubs and
/// border cells never qualify.
pub fn is_breakable(grid: &Grid, p: Point) -> bool {
    if !grid.in_interior(p) || !grid.is_wall(p) {
        return false;
    }
    let right = grid.is_wall(p.offset(1, 0));
    let left = grid.is_wall(p.offset(-1, 0));
    let up = grid.is_wall(p.offset(0, 1));
    let down = grid.is_wall(p.offset(0, -1));

    (right && left && !(up || down)) || (up && down && !(right || left))
}

/// Opens up to `count` breakable walls, scanning from random offsets.
///
/// Returns the number of walls actually broken; stops early once no
/// breakable wall remains.
pub fn break_walls<R: Rng>(grid: &mut Grid, count: usize, rng: &mut R) -> usize {
    let cells = grid.cell_count();
    let mut broken = 0;

    for _ in 0..count {
        let start = rng.random_range(0..cells);
        let found = (0..cells)
            .map(|k| grid.point_at((start + k) % cells))
            .find(|&p| is_breakable(grid, p));

        match found {
            Some(p) => {
                grid.set(p, Cell::Path);
                broken += 1;
            }
            None => {
                debug!("no breakable wall left after {broken} breaks");
                break;
            }
        }
    }
    broken
}
