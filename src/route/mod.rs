//! Geometric waypoint selection along a route corridor.

mod waypoint_selection;

pub use waypoint_selection::WaypointSelector;
