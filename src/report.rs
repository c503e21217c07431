//! Plan quality metrics (KPIs).
//!
//! Computes the indicators a caller reports for a finished rescue plan.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Value | Sum of visited stations' values |
//! | Coverage | Stations assigned / stations available |
//! | Steps per Unit | Route length of each unit |
//! | Value per Unit | Station value collected by each unit |
//! | Budget Utilization | Mean of steps / budget over units |
//! | Unreachable Units | Units whose route has a missing leg |

use serde::{Deserialize, Serialize};

use crate::models::{station_value, HostageStation, LocationId, PathStore, Plan};

/// Sum of station values over every unit's stops. Start locations and
/// unknown ids contribute nothing.
pub fn total_value(plan: &Plan, stations: &[HostageStation]) -> f64 {
    plan.iter()
        .flat_map(|path| path.iter().skip(1))
        .map(|&id| station_value(stations, id))
        .sum()
}

/// Plan performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanKpi {
    /// Sum of visited station values.
    pub total_value: f64,
    /// Station visits across all units.
    pub stations_assigned: usize,
    /// Stations that could have been visited.
    pub stations_available: usize,
    /// Route length per unit; `None` for a route with an unreachable leg.
    pub steps_by_unit: Vec<Option<u32>>,
    /// Collected value per unit.
    pub value_by_unit: Vec<f64>,
    /// Mean fraction of the step budget used (0.0..=1.0 for feasible plans).
    pub budget_utilization: f64,
}

impl PlanKpi {
    /// Computes KPIs for a plan.
    ///
    /// # Arguments
    /// * `plan` - One stop list per unit, each starting at the entrance.
    /// * `paths` - Precomputed routes, for step counts.
    /// * `stations` - Station registry, for values.
    /// * `candidates` - Station ids the planner could choose from.
    /// * `unit_step_budget` - Per-unit budget, for utilization.
    pub fn calculate(
        plan: &Plan,
        paths: &PathStore,
        stations: &[HostageStation],
        candidates: &[LocationId],
        unit_step_budget: u32,
    ) -> Self {
        let steps_by_unit: Vec<Option<u32>> =
            plan.iter().map(|path| paths.path_distance(path)).collect();
        let value_by_unit: Vec<f64> = plan
            .iter()
            .map(|path| {
                path.iter()
                    .skip(1)
                    .map(|&id| station_value(stations, id))
                    .sum()
            })
            .collect();

        let budget_utilization = if plan.is_empty() || unit_step_budget == 0 {
            0.0
        } else {
            let used: f64 = steps_by_unit
                .iter()
                .flatten()
                .map(|&s| f64::from(s) / f64::from(unit_step_budget))
                .sum();
            used / plan.len() as f64
        };

        Self {
            total_value: value_by_unit.iter().sum(),
            stations_assigned: plan.iter().map(|p| p.len().saturating_sub(1)).sum(),
            stations_available: candidates.len(),
            steps_by_unit,
            value_by_unit,
            budget_utilization,
        }
    }

    /// Fraction of available stations assigned (1.0 when none are available).
    pub fn coverage(&self) -> f64 {
        if self.stations_available == 0 {
            1.0
        } else {
            self.stations_assigned as f64 / self.stations_available as f64
        }
    }

    /// Number of units whose route has an unreachable leg.
    pub fn unreachable_units(&self) -> usize {
        self.steps_by_unit.iter().filter(|s| s.is_none()).count()
    }

    /// Whether every unit is reachable and within `unit_step_budget`.
    pub fn within_budget(&self, unit_step_budget: u32) -> bool {
        self.steps_by_unit
            .iter()
            .all(|s| s.is_some_and(|s| s <= unit_step_budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PathKey, Point, StationProfile};

    fn station(subgrid: usize, count: u32) -> HostageStation {
        let profile = StationProfile {
            hostage_chance: 0.5,
            hostage_count: count,
            kidnapper_chance: 0.5,
            soldier_loss_chance: 0.2,
        };
        HostageStation::new(Point::new(subgrid as i32, 1), subgrid, profile)
    }

    fn sample_stations() -> Vec<HostageStation> {
        // values: 1.9, 3.9, 0.0 (unplaced)
        vec![station(0, 4), station(1, 8), HostageStation::unplaced(2)]
    }

    fn sample_paths() -> PathStore {
        let mut store = PathStore::new();
        let line = |n: i32| (0..=n).map(|x| Point::new(x, 0)).collect::<Vec<_>>();
        store.insert(PathKey::new(0, 1), line(4));
        store.insert(PathKey::new(0, 2), line(6));
        store.insert(PathKey::new(1, 2), line(3));
        store
    }

    #[test]
    fn test_total_value() {
        let stations = sample_stations();
        let plan = vec![vec![0, 1], vec![0, 2, 3]];
        assert!((total_value(&plan, &stations) - 5.8).abs() < 1e-9);
        assert_eq!(total_value(&vec![vec![0]], &stations), 0.0);
    }

    #[test]
    fn test_kpi_basic() {
        let plan = vec![vec![0, 1, 2], vec![0]];
        let kpi = PlanKpi::calculate(&plan, &sample_paths(), &sample_stations(), &[1, 2], 10);

        assert!((kpi.total_value - 5.8).abs() < 1e-9);
        assert_eq!(kpi.stations_assigned, 2);
        assert_eq!(kpi.steps_by_unit, vec![Some(7), Some(0)]);
        assert!((kpi.value_by_unit[0] - 5.8).abs() < 1e-9);
        assert_eq!(kpi.value_by_unit[1], 0.0);
        assert!((kpi.budget_utilization - 0.35).abs() < 1e-9);
        assert_eq!(kpi.coverage(), 1.0);
        assert!(kpi.within_budget(10));
        assert!(!kpi.within_budget(6));
    }

    #[test]
    fn test_kpi_unreachable_unit() {
        let plan = vec![vec![0, 3]];
        let kpi = PlanKpi::calculate(&plan, &sample_paths(), &sample_stations(), &[1, 2], 10);
        assert_eq!(kpi.unreachable_units(), 1);
        assert!(!kpi.within_budget(100));
        assert_eq!(kpi.coverage(), 0.5);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = PlanKpi::calculate(&Vec::new(), &sample_paths(), &[], &[], 10);
        assert_eq!(kpi.total_value, 0.0);
        assert_eq!(kpi.budget_utilization, 0.0);
        assert_eq!(kpi.coverage(), 1.0);
    }
}
