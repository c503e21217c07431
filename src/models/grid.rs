//! Fixed-size cell grid.
//!
//! The grid is stored row-major in one contiguous buffer. Every coordinate
//! access is range-checked; out-of-range writes are logged and rejected.
//!
//! Row `y = 0` is the bottom border. [`Display`](std::fmt::Display) prints
//! the top row first.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Point;
use crate::error::RescueError;

/// Box-drawing variant of a wall cell.
///
/// Freshly carved mazes only contain [`WallGlyph::Solid`]; re-skinning
/// replaces it with a directional glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallGlyph {
    /// Undecorated wall block.
    Solid,
    /// `╔`
    TopLeftCorner,
    /// `╗`
    TopRightCorner,
    /// `╚`
    BottomLeftCorner,
    /// `╝`
    BottomRightCorner,
    /// `═`
    Horizontal,
    /// `║`
    Vertical,
    /// `╠`
    RightTee,
    /// `╦`
    BottomTee,
    /// `╩`
    TopTee,
    /// `╣`
    LeftTee,
    /// `╬`
    Cross,
}

impl WallGlyph {
    /// Character used when rendering the glyph.
    pub fn as_char(self) -> char {
        match self {
            WallGlyph::Solid => '█',
            WallGlyph::TopLeftCorner => '╔',
            WallGlyph::TopRightCorner => '╗',
            WallGlyph::BottomLeftCorner => '╚',
            WallGlyph::BottomRightCorner => '╝',
            WallGlyph::Horizontal => '═',
            WallGlyph::Vertical => '║',
            WallGlyph::RightTee => '╠',
            WallGlyph::BottomTee => '╦',
            WallGlyph::TopTee => '╩',
            WallGlyph::LeftTee => '╣',
            WallGlyph::Cross => '╬',
        }
    }
}

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable wall.
    Wall(WallGlyph),
    /// Open corridor.
    Path,
    /// Hostage station marker (traversable).
    Station,
    /// Unit entrance marker (traversable).
    Entrance,
}

impl Cell {
    /// Plain undecorated wall.
    pub const WALL: Cell = Cell::Wall(WallGlyph::Solid);

    /// Whether the cell blocks movement.
    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall(_))
    }

    /// Whether units may move through the cell.
    #[inline]
    pub fn is_traversable(self) -> bool {
        !self.is_wall()
    }

    /// Character used when rendering the cell.
    pub fn as_char(self) -> char {
        match self {
            Cell::Wall(glyph) => glyph.as_char(),
            Cell::Path => ' ',
            Cell::Station => '@',
            Cell::Entrance => 'E',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' | '█' => Some(Cell::WALL),
            ' ' | '.' => Some(Cell::Path),
            '@' => Some(Cell::Station),
            'E' => Some(Cell::Entrance),
            _ => None,
        }
    }
}

/// A `width × height` matrix of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocates a grid filled with walls.
    ///
    /// # Errors
    /// [`RescueError::Allocation`] when the dimensions are zero, overflow,
    /// or the buffer cannot be reserved.
    pub fn new(width: usize, height: usize) -> Result<Self, RescueError> {
        let count = width
            .checked_mul(height)
            .filter(|&n| n > 0)
            .ok_or_else(|| RescueError::Allocation(format!("invalid grid size {width}x{height}")))?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|e| RescueError::Allocation(format!("grid {width}x{height}: {e}")))?;
        cells.resize(count, Cell::WALL);

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Builds a grid from text rows. Row `i` of the input becomes `y = i`.
    ///
    /// `#` is a wall, space or `.` a path, `@` a station, `E` an entrance.
    /// Returns `None` for ragged rows or unknown characters.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.chars().count();
        let mut grid = Grid::new(width, height).ok()?;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return None;
            }
            for (x, c) in row.chars().enumerate() {
                let idx = y * width + x;
                grid.cells[idx] = Cell::from_char(c)?;
            }
        }
        Some(grid)
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `p` lies on the grid.
    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        self.index(p).is_some()
    }

    /// Whether `p` lies strictly inside the outer border.
    pub fn in_interior(&self, p: Point) -> bool {
        p.x >= 1
            && p.y >= 1
            && (p.x as i64) < self.width as i64 - 1
            && (p.y as i64) < self.height as i64 - 1
    }

    /// Row-major buffer index of `p`, if in bounds.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        let x = usize::try_from(p.x).ok()?;
        let y = usize::try_from(p.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Point for a row-major buffer index.
    #[inline]
    pub fn point_at(&self, index: usize) -> Point {
        Point::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Cell at `p`, if in bounds.
    #[inline]
    pub fn get(&self, p: Point) -> Option<Cell> {
        self.index(p).map(|i| self.cells[i])
    }

    /// Writes `cell` at `p`. Out-of-range writes are logged and ignored.
    ///
    /// Returns whether the write happened.
    pub fn set(&mut self, p: Point, cell: Cell) -> bool {
        match self.index(p) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => {
                warn!("rejected write outside {}x{} grid at {p}", self.width, self.height);
                false
            }
        }
    }

    /// Whether `p` is in bounds and holds a wall of any glyph.
    #[inline]
    pub fn is_wall(&self, p: Point) -> bool {
        self.get(p).is_some_and(Cell::is_wall)
    }

    /// Whether `p` is in bounds and not a wall.
    #[inline]
    pub fn is_traversable(&self, p: Point) -> bool {
        self.get(p).is_some_and(Cell::is_traversable)
    }

    /// Refills the whole grid with plain walls.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::WALL);
    }

    /// Iterates `(point, cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Point, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (self.point_at(i), c))
    }

    /// Iterates every traversable point.
    pub fn open_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells()
            .filter(|(_, c)| c.is_traversable())
            .map(|(p, _)| p)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            let row = &self.cells[y * self.width..(y + 1) * self.width];
            let line: String = row.iter().map(|c| c.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
