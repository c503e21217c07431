//! Per-unit route reordering.
//!
//! After the GA has fixed *which* stations each unit visits, the visiting
//! order of each unit is optimized exhaustively: every permutation of the
//! stops is costed against the path store and the shortest one wins. The
//! start location stays first.
//!
//! Only strict improvements replace a route, so refining a refined plan
//! changes nothing.

use log::debug;

use crate::models::{LocationId, PathStore, Plan};

/// Reorders every unit's stops to minimize route length.
///
/// Units with fewer than two stops, or more than `max_stops`, are left
/// alone. Returns the number of units whose route changed.
pub fn refine_plan(plan: &mut Plan, paths: &PathStore, max_stops: usize) -> usize {
    let mut improved = 0;
    for (unit, path) in plan.iter_mut().enumerate() {
        let stops = path.len().saturating_sub(1);
        if stops < 2 || stops > max_stops {
            continue;
        }
        if let Some((before, after)) = refine_unit_path(path, paths) {
            debug!("unit {unit}: route shortened from {before} to {after} steps");
            improved += 1;
        }
    }
    improved
}

/// Finds the shortest ordering of `path[1..]` with `path[0]` fixed.
///
/// Permutations with an unreachable leg are skipped. On strict improvement
/// the path is rewritten and `(old, new)` distances are returned. A path
/// whose current order is itself unreachable is replaced by the best
/// reachable order, reported with `old = u32::MAX`.
pub fn refine_unit_path(path: &mut [LocationId], paths: &PathStore) -> Option<(u32, u32)> {
    let (start, stops) = path.split_first()?;
    if stops.len() < 2 {
        return None;
    }
    let current = paths.path_distance(path).unwrap_or(u32::MAX);

    let mut candidate: Vec<LocationId> = stops.to_vec();
    candidate.sort_unstable();
    let mut walk = Vec::with_capacity(path.len());
    let mut best: Option<(u32, Vec<LocationId>)> = None;

    loop {
        walk.clear();
        walk.push(*start);
        walk.extend_from_slice(&candidate);
        if let Some(distance) = paths.path_distance(&walk) {
            if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, candidate.clone()));
            }
        }
        if !next_permutation(&mut candidate) {
            break;
        }
    }

    match best {
        Some((distance, order)) if distance < current => {
            path[1..].copy_from_slice(&order);
            Some((current, distance))
        }
        _ => None,
    }
}

/// Advances `items` to the next lexicographic permutation.
///
/// Returns `false` (leaving the slice sorted descending) after the last one.
fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(successor) = items.iter().rposition(|x| *x > items[pivot]) else {
        return false;
    };
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}
