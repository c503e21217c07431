//! Location identifiers and canonical path keys.
//!
//! The units' shared entrance is [`ENTRANCE_ID`] (0). Each validly placed
//! station is identified by its subgrid index plus one, so ids are stable
//! for the lifetime of a run.

use serde::{Deserialize, Serialize};

/// Identifier of an important point (entrance or station).
pub type LocationId = usize;

/// Id of the units' shared entrance.
pub const ENTRANCE_ID: LocationId = 0;

/// Station id for a subgrid index.
#[inline]
pub const fn station_id(subgrid: usize) -> LocationId {
    subgrid + 1
}

/// Unordered pair of location ids, stored as `(min, max)`.
///
/// `PathKey::new(a, b) == PathKey::new(b, a)` for all `a`, `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathKey {
    low: LocationId,
    high: LocationId,
}

impl PathKey {
    /// Builds the canonical key for a pair of ids.
    #[inline]
    pub fn new(a: LocationId, b: LocationId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Smaller id of the pair.
    #[inline]
    pub fn low(&self) -> LocationId {
        self.low
    }

    /// Larger id of the pair.
    #[inline]
    pub fn high(&self) -> LocationId {
        self.high
    }
}

/// An important point: an id together with its grid location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantPoint {
    /// Location id.
    pub id: LocationId,
    /// Cell the point occupies.
    pub at: super::Point,
}

impl ImportantPoint {
    /// Creates an important point.
    pub fn new(id: LocationId, at: super::Point) -> Self {
        Self { id, at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_symmetric() {
        for a in 0..6 {
            for b in 0..6 {
                assert_eq!(PathKey::new(a, b), PathKey::new(b, a));
            }
        }
    }

    #[test]
    fn test_key_orders_pair() {
        let key = PathKey::new(7, 2);
        assert_eq!(key.low(), 2);
        assert_eq!(key.high(), 7);
    }

    #[test]
    fn test_station_id_is_one_based() {
        assert_eq!(station_id(0), 1);
        assert_ne!(station_id(0), ENTRANCE_ID);
    }
}
