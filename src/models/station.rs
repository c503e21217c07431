//! Hostage station model.
//!
//! One station record exists per subgrid. Stations whose subgrid had no
//! free path cell carry no location and zero value; they are never routed.

use serde::{Deserialize, Serialize};

use super::{station_id, LocationId, Point};

/// Random parameters describing what a station holds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationProfile {
    /// Probability that hostages are present (0.0..=1.0).
    pub hostage_chance: f64,
    /// Number of hostages held.
    pub hostage_count: u32,
    /// Probability that kidnappers are present (0.0..=1.0).
    pub kidnapper_chance: f64,
    /// Probability of losing a soldier when kidnappers are present.
    pub soldier_loss_chance: f64,
}

impl StationProfile {
    /// Expected yield minus risk.
    #[inline]
    pub fn value(&self) -> f64 {
        self.hostage_count as f64 * self.hostage_chance
            - self.kidnapper_chance * self.soldier_loss_chance
    }
}

/// A hostage station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostageStation {
    /// Placed cell, or `None` when placement failed.
    pub location: Option<Point>,
    /// Index of the subgrid this station belongs to.
    pub subgrid: usize,
    /// Random parameters.
    pub profile: StationProfile,
}

impl HostageStation {
    /// Creates a placed station.
    pub fn new(location: Point, subgrid: usize, profile: StationProfile) -> Self {
        Self {
            location: Some(location),
            subgrid,
            profile,
        }
    }

    /// Creates the placeholder recorded when a subgrid had no free cell.
    pub fn unplaced(subgrid: usize) -> Self {
        Self {
            location: None,
            subgrid,
            profile: StationProfile::default(),
        }
    }

    /// Location id of this station.
    #[inline]
    pub fn id(&self) -> LocationId {
        station_id(self.subgrid)
    }

    /// Whether the station has a real location.
    #[inline]
    pub fn is_placed(&self) -> bool {
        self.location.is_some()
    }

    /// Scalar value: `hostage_count × hostage_chance − kidnapper_chance × soldier_loss_chance`.
    ///
    /// Always 0 for unplaced stations.
    pub fn value(&self) -> f64 {
        if self.is_placed() {
            self.profile.value()
        } else {
            0.0
        }
    }
}

/// Looks up the value of a station id within a registry indexed by subgrid.
///
/// The entrance and unknown ids contribute nothing.
pub fn station_value(stations: &[HostageStation], id: LocationId) -> f64 {
    id.checked_sub(1)
        .and_then(|idx| stations.get(idx))
        .map(HostageStation::value)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StationProfile {
        StationProfile {
            hostage_chance: 0.5,
            hostage_count: 4,
            kidnapper_chance: 0.5,
            soldier_loss_chance: 0.2,
        }
    }

    #[test]
    fn test_value_formula() {
        let s = HostageStation::new(Point::new(1, 1), 0, profile());
        assert!((s.value() - 1.9).abs() < 1e-12);
    }

    #[test]
    fn test_unplaced_station_is_worthless() {
        let s = HostageStation::unplaced(3);
        assert!(!s.is_placed());
        assert_eq!(s.value(), 0.0);
        assert_eq!(s.id(), 4);
    }

    #[test]
    fn test_station_value_lookup() {
        let stations = vec![
            HostageStation::new(Point::new(1, 1), 0, profile()),
            HostageStation::unplaced(1),
        ];
        assert!((station_value(&stations, 1) - 1.9).abs() < 1e-12);
        assert_eq!(station_value(&stations, 0), 0.0);
        assert_eq!(station_value(&stations, 2), 0.0);
        assert_eq!(station_value(&stations, 99), 0.0);
    }
}
