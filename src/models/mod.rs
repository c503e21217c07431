//! Rescue planning domain models.
//!
//! Provides the data types shared by the maze generator, the path engine,
//! and the planner.
//!
//! | Type | Role |
//! |------|------|
//! | `Grid` / `Cell` | Maze cells with wall/path semantics |
//! | `Point` | Cell coordinate, ordered x then y |
//! | `LocationId` / `PathKey` | Entrance (0) and station ids; unordered id pair |
//! | `HostageStation` | Placed station with its derived value |
//! | `PathStore` | Precomputed shortest routes per `PathKey` |

mod grid;
mod location;
mod paths;
mod point;
mod station;

pub use grid::{Cell, Grid, WallGlyph};
pub use location::{station_id, ImportantPoint, LocationId, PathKey, ENTRANCE_ID};
pub use paths::PathStore;
pub use point::{Point, AXIS_OFFSETS};
pub use station::{station_value, HostageStation, StationProfile};

/// One ordered stop list per unit, each starting with the entrance.
pub type Plan = Vec<Vec<LocationId>>;
