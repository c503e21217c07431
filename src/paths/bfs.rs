//! Single-source breadth-first search over the maze.
//!
//! Walls are obstacles; every other cell (path, station, entrance) is
//! traversable. The search records one parent per reached cell, which is
//! enough to rebuild a shortest route to any reached cell.

use std::collections::VecDeque;

use log::error;

use crate::models::{Grid, Point};

/// Parent pointers produced by [`search`].
#[derive(Debug, Clone)]
pub struct SearchTree {
    start: Point,
    width: usize,
    height: usize,
    parents: Vec<Option<usize>>,
}

impl SearchTree {
    /// Source of the search.
    pub fn start(&self) -> Point {
        self.start
    }

    fn index(&self, p: Point) -> Option<usize> {
        let x = usize::try_from(p.x).ok()?;
        let y = usize::try_from(p.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn point(&self, index: usize) -> Point {
        Point::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Whether the search reached `p`.
    pub fn reached(&self, p: Point) -> bool {
        self.index(p)
            .is_some_and(|i| self.parents[i].is_some())
    }

    /// Shortest route from the start to `goal`, inclusive of both ends.
    ///
    /// `None` when `goal` was not reached. The walk back is bounded by the
    /// cell count so a corrupt parent chain cannot loop forever.
    pub fn path_to(&self, goal: Point) -> Option<Vec<Point>> {
        let start_idx = self.index(self.start)?;
        let mut current = self.index(goal)?;
        let mut route = vec![self.point(current)];

        for _ in 0..self.parents.len() {
            if current == start_idx {
                route.reverse();
                return Some(route);
            }
            current = self.parents[current]?;
            route.push(self.point(current));
        }
        None
    }
}

/// Runs a BFS from `start`.
///
/// Returns `None` (after logging) when `start` is off the grid or a wall.
pub fn search(grid: &Grid, start: Point) -> Option<SearchTree> {
    let Some(start_idx) = grid.index(start) else {
        error!("bfs start {start} is outside the {}x{} grid", grid.width(), grid.height());
        return None;
    };
    if !grid.is_traversable(start) {
        error!("bfs start {start} is a wall");
        return None;
    }

    let mut parents = vec![None; grid.cell_count()];
    parents[start_idx] = Some(start_idx);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let Some(current_idx) = grid.index(current) else {
            continue;
        };
        for next in current.neighbors() {
            if !grid.is_traversable(next) {
                continue;
            }
            let Some(next_idx) = grid.index(next) else {
                continue;
            };
            if parents[next_idx].is_some() {
                continue;
            }
            parents[next_idx] = Some(current_idx);
            queue.push_back(next);
        }
    }

    Some(SearchTree {
        start,
        width: grid.width(),
        height: grid.height(),
        parents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room() -> Grid {
        Grid::from_rows(&["  E  ", "     ", "     ", "     ", "  @  "]).unwrap()
    }

    #[test]
    fn test_open_room_straight_line() {
        let grid = open_room();
        let tree = search(&grid, Point::new(2, 0)).unwrap();
        let route = tree.path_to(Point::new(2, 4)).unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route.first(), Some(&Point::new(2, 0)));
        assert_eq!(route.last(), Some(&Point::new(2, 4)));
    }

    #[test]
    fn test_route_to_start_is_single_cell() {
        let grid = open_room();
        let tree = search(&grid, Point::new(2, 0)).unwrap();
        assert_eq!(tree.path_to(Point::new(2, 0)), Some(vec![Point::new(2, 0)]));
    }

    #[test]
    fn test_route_avoids_walls() {
        let grid = Grid::from_rows(&[
            "E  ",
            "## ",
            "@  ",
        ])
        .unwrap();
        let tree = search(&grid, Point::new(0, 0)).unwrap();
        let route = tree.path_to(Point::new(0, 2)).unwrap();
        assert_eq!(route.len(), 7);
        assert!(route.iter().all(|&p| grid.is_traversable(p)));
        assert!(route.windows(2).all(|w| w[0].manhattan(w[1]) == 1));
    }

    #[test]
    fn test_unreachable_goal() {
        let grid = Grid::from_rows(&["E#@"]).unwrap();
        let tree = search(&grid, Point::new(0, 0)).unwrap();
        assert!(!tree.reached(Point::new(2, 0)));
        assert_eq!(tree.path_to(Point::new(2, 0)), None);
        assert_eq!(tree.path_to(Point::new(7, 7)), None);
    }

    #[test]
    fn test_bad_start_rejected() {
        let grid = Grid::from_rows(&["E#@"]).unwrap();
        assert!(search(&grid, Point::new(5, 0)).is_none());
        assert!(search(&grid, Point::new(1, 0)).is_none());
    }
}
