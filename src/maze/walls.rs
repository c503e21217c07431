//! Wall re-skinning with box-drawing glyphs.
//!
//! Each inner wall picks its glyph from a 4-bit pattern of wall
//! neighbours: right = 1, up = 2, left = 4, down = 8. Border cells and the
//! four corners are handled separately so the frame reads as one line.

use crate::models::{Cell, Grid, Point, WallGlyph};

/// Glyph for each neighbour pattern.
pub const WALL_GLYPH_BY_PATTERN: [WallGlyph; 16] = [
    WallGlyph::Horizontal,        // isolated
    WallGlyph::Horizontal,        // right
    WallGlyph::Vertical,          // up
    WallGlyph::BottomLeftCorner,  // right + up
    WallGlyph::Horizontal,        // left
    WallGlyph::Horizontal,        // right + left
    WallGlyph::BottomRightCorner, // up + left
    WallGlyph::TopTee,            // right + up + left
    WallGlyph::Vertical,          // down
    WallGlyph::TopLeftCorner,     // right + down
    WallGlyph::Vertical,          // up + down
    WallGlyph::RightTee,          // right + up + down
    WallGlyph::TopRightCorner,    // left + down
    WallGlyph::BottomTee,         // right + left + down
    WallGlyph::LeftTee,           // up + left + down
    WallGlyph::Cross,             // all four
];

/// Neighbour pattern of the cell at `p`.
pub fn wall_pattern(grid: &Grid, p: Point) -> usize {
    let wall = |dx, dy| usize::from(grid.is_wall(p.offset(dx, dy)));
    wall(1, 0) | wall(0, 1) << 1 | wall(-1, 0) << 2 | wall(0, -1) << 3
}

/// Replaces every wall with its directional glyph.
pub fn reskin(grid: &mut Grid) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    if w < 3 || h < 3 {
        return;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let p = Point::new(x, y);
            if grid.is_wall(p) {
                let glyph = WALL_GLYPH_BY_PATTERN[wall_pattern(grid, p)];
                grid.set(p, Cell::Wall(glyph));
            }
        }
    }

    let edge = |open: bool, closed: WallGlyph, straight: WallGlyph| {
        Cell::Wall(if open { straight } else { closed })
    };

    for x in 1..w - 1 {
        let bottom = edge(!grid.is_wall(Point::new(x, 1)), WallGlyph::TopTee, WallGlyph::Horizontal);
        let top = edge(!grid.is_wall(Point::new(x, h - 2)), WallGlyph::BottomTee, WallGlyph::Horizontal);
        grid.set(Point::new(x, 0), bottom);
        grid.set(Point::new(x, h - 1), top);
    }
    for y in 1..h - 1 {
        let left = edge(!grid.is_wall(Point::new(1, y)), WallGlyph::RightTee, WallGlyph::Vertical);
        let right = edge(!grid.is_wall(Point::new(w - 2, y)), WallGlyph::LeftTee, WallGlyph::Vertical);
        grid.set(Point::new(0, y), left);
        grid.set(Point::new(w - 1, y), right);
    }

    grid.set(Point::new(0, 0), Cell::Wall(WallGlyph::BottomLeftCorner));
    grid.set(Point::new(w - 1, 0), Cell::Wall(WallGlyph::BottomRightCorner));
    grid.set(Point::new(w - 1, h - 1), Cell::Wall(WallGlyph::TopRightCorner));
    grid.set(Point::new(0, h - 1), Cell::Wall(WallGlyph::TopLeftCorner));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_bits() {
        let grid = Grid::from_rows(&[
            "#####",
            "#   #",
            "# # #",
            "#   #",
            "#####",
        ])
        .unwrap();
        assert_eq!(wall_pattern(&grid, Point::new(2, 2)), 0);
        // (1,0) on the bottom border: walls right and left, open above
        assert_eq!(wall_pattern(&grid, Point::new(1, 0)), 1 | 4);
    }

    #[test]
    fn test_reskin_keeps_walls_walls() {
        let mut grid = Grid::from_rows(&[
            "#######",
            "#   # #",
            "# ### #",
            "#     #",
            "#######",
        ])
        .unwrap();
        let open_before: Vec<Point> = grid.open_cells().collect();
        reskin(&mut grid);
        let open_after: Vec<Point> = grid.open_cells().collect();
        assert_eq!(open_before, open_after);
        assert!(grid
            .cells()
            .all(|(_, c)| c != Cell::WALL));
    }

    #[test]
    fn test_reskin_corners_and_edges() {
        let mut grid = Grid::from_rows(&["#####", "#   #", "## ##", "#   #", "#####"]).unwrap();
        reskin(&mut grid);
        assert_eq!(grid.get(Point::new(0, 0)), Some(Cell::Wall(WallGlyph::BottomLeftCorner)));
        assert_eq!(grid.get(Point::new(4, 4)), Some(Cell::Wall(WallGlyph::TopRightCorner)));
        // bottom edge above an open cell is a straight line
        assert_eq!(grid.get(Point::new(2, 0)), Some(Cell::Wall(WallGlyph::Horizontal)));
        // left edge next to the (1,2) wall stub gets a tee
        assert_eq!(grid.get(Point::new(0, 2)), Some(Cell::Wall(WallGlyph::RightTee)));
        // stub (1,2) joins the left border only
        assert_eq!(grid.get(Point::new(1, 2)), Some(Cell::Wall(WallGlyph::Horizontal)));
    }

    #[test]
    fn test_table_is_symmetric_for_straights() {
        assert_eq!(WALL_GLYPH_BY_PATTERN[5], WallGlyph::Horizontal);
        assert_eq!(WALL_GLYPH_BY_PATTERN[10], WallGlyph::Vertical);
        assert_eq!(WALL_GLYPH_BY_PATTERN[15], WallGlyph::Cross);
    }
}
