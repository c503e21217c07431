//! Precomputed shortest routes between important points.

use std::collections::HashMap;

use log::warn;

use super::{LocationId, PathKey, Point};

/// Map from canonical [`PathKey`] to the shortest route between the pair.
///
/// Each route is inclusive of both endpoints and runs from the point with
/// the smaller id to the point with the larger id. Every key is written at
/// most once.
#[derive(Debug, Clone, Default)]
pub struct PathStore {
    routes: HashMap<PathKey, Vec<Point>>,
}

impl PathStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the route for `key`.
    ///
    /// Returns `false` and keeps the existing route if the key was already
    /// written. Empty routes are refused.
    pub fn insert(&mut self, key: PathKey, route: Vec<Point>) -> bool {
        if route.is_empty() {
            warn!("refusing empty route for {key:?}");
            return false;
        }
        if self.routes.contains_key(&key) {
            warn!("route for {key:?} already recorded; keeping the first");
            return false;
        }
        self.routes.insert(key, route);
        true
    }

    /// Stored route between `a` and `b`, in stored (low → high) direction.
    pub fn get(&self, a: LocationId, b: LocationId) -> Option<&[Point]> {
        self.routes
            .get(&PathKey::new(a, b))
            .map(Vec::as_slice)
            .filter(|r| !r.is_empty())
    }

    /// Route walked from `from` to `to`.
    pub fn route(&self, from: LocationId, to: LocationId) -> Option<Vec<Point>> {
        let stored = self.get(from, to)?;
        let mut route = stored.to_vec();
        if from > to {
            route.reverse();
        }
        Some(route)
    }

    /// Step count between two locations.
    ///
    /// `Some(0)` for `a == b`; `None` when no route is known. A missing
    /// route means unreachable, never zero cost.
    pub fn cost(&self, a: LocationId, b: LocationId) -> Option<u32> {
        if a == b {
            return Some(0);
        }
        self.get(a, b).map(|r| (r.len() - 1) as u32)
    }

    /// Total step count walking `stops` in order.
    ///
    /// `Some(0)` for zero or one stop; `None` if any leg is unreachable.
    pub fn path_distance(&self, stops: &[LocationId]) -> Option<u32> {
        stops
            .windows(2)
            .try_fold(0u32, |acc, leg| Some(acc + self.cost(leg[0], leg[1])?))
    }

    /// Number of stored routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Whether a route is stored for the pair.
    pub fn contains(&self, a: LocationId, b: LocationId) -> bool {
        self.routes.contains_key(&PathKey::new(a, b))
    }

    /// Iterates over all stored routes.
    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, &[Point])> {
        self.routes.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(len: i32) -> Vec<Point> {
        (0..len).map(|y| Point::new(0, y)).collect()
    }

    #[test]
    fn test_insert_at_most_once() {
        let mut store = PathStore::new();
        assert!(store.insert(PathKey::new(0, 1), straight(3)));
        assert!(!store.insert(PathKey::new(1, 0), straight(5)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.cost(0, 1), Some(2));
    }

    #[test]
    fn test_cost_is_symmetric() {
        let mut store = PathStore::new();
        store.insert(PathKey::new(2, 5), straight(4));
        assert_eq!(store.cost(2, 5), store.cost(5, 2));
        assert_eq!(store.cost(5, 2), Some(3));
    }

    #[test]
    fn test_missing_route_is_unreachable() {
        let mut store = PathStore::new();
        assert_eq!(store.cost(0, 3), None);
        assert_eq!(store.cost(3, 3), Some(0));
        assert!(!store.insert(PathKey::new(0, 3), Vec::new()));
    }

    #[test]
    fn test_route_orientation() {
        let mut store = PathStore::new();
        store.insert(PathKey::new(1, 2), straight(3));
        let forward = store.route(1, 2).unwrap();
        let backward = store.route(2, 1).unwrap();
        assert_eq!(forward.first(), Some(&Point::new(0, 0)));
        assert_eq!(backward.first(), Some(&Point::new(0, 2)));
    }

    #[test]
    fn test_path_distance() {
        let mut store = PathStore::new();
        store.insert(PathKey::new(0, 1), straight(4));
        store.insert(PathKey::new(1, 2), straight(2));
        assert_eq!(store.path_distance(&[0]), Some(0));
        assert_eq!(store.path_distance(&[]), Some(0));
        assert_eq!(store.path_distance(&[0, 1, 2]), Some(4));
        assert_eq!(store.path_distance(&[0, 2]), None);
    }
}
