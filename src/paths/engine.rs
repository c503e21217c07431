//! Concurrent all-pairs route precomputation.
//!
//! One BFS job runs per important point. Each job rebuilds routes only to
//! points with a strictly larger id, so every unordered pair is computed
//! once, by its smaller endpoint. Jobs own `Arc` handles to the grid, the
//! point list, and the shared result sink; the sink's mutex is held only
//! while a job inserts its finished routes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use log::{error, info, warn};

use super::bfs::search;
use crate::models::{Grid, ImportantPoint, PathKey, PathStore, Point};
use crate::pool::WorkerPool;

/// Routes from `source` to every point with a larger id.
///
/// Unreachable targets are skipped. Returns an empty list if the search
/// could not start.
pub fn routes_from(
    grid: &Grid,
    source: ImportantPoint,
    points: &[ImportantPoint],
) -> Vec<(PathKey, Vec<Point>)> {
    let Some(tree) = search(grid, source.at) else {
        return Vec::new();
    };

    points
        .iter()
        .filter(|target| target.id > source.id)
        .filter_map(|target| match tree.path_to(target.at) {
            Some(route) => Some((PathKey::new(source.id, target.id), route)),
            None => {
                warn!("location {} unreachable from {}", target.id, source.id);
                None
            }
        })
        .collect()
}

/// Computes shortest routes between all important points on `pool`.
///
/// Blocks until every job has finished; the returned store is complete
/// and needs no further locking. An empty point list, or one containing
/// off-grid points, is rejected with an error log and yields an empty
/// store.
pub fn compute_all_paths(
    grid: Arc<Grid>,
    points: Arc<Vec<ImportantPoint>>,
    pool: &WorkerPool,
) -> PathStore {
    if points.is_empty() {
        error!("route precomputation requested with no important points");
        return PathStore::new();
    }
    if let Some(bad) = points.iter().find(|p| !grid.in_bounds(p.at)) {
        error!("important point {} at {} lies outside the grid", bad.id, bad.at);
        return PathStore::new();
    }
    let mut ids = HashSet::new();
    if let Some(dup) = points.iter().find(|p| !ids.insert(p.id)) {
        error!("important point id {} appears more than once", dup.id);
        return PathStore::new();
    }

    let sink = Arc::new(Mutex::new(PathStore::new()));

    for source in points.iter().copied() {
        let grid = Arc::clone(&grid);
        let points = Arc::clone(&points);
        let sink = Arc::clone(&sink);
        pool.execute(move || {
            let routes = routes_from(&grid, source, &points);
            let mut store = sink.lock().unwrap_or_else(PoisonError::into_inner);
            for (key, route) in routes {
                store.insert(key, route);
            }
        });
    }
    pool.wait_all();

    let store = match Arc::try_unwrap(sink) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
        Err(shared) => shared.lock().unwrap_or_else(PoisonError::into_inner).clone(),
    };
    info!(
        "computed {} routes between {} important points",
        store.len(),
        points.len()
    );
    store
}
