use crate::models::{Coordinates, PoiRecord, SimilarityHit};
use serde::{Deserialize, Serialize};

/// Travel profiles tried in priority order when requesting a route polyline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoutingProfile {
    Driving,
    Walking,
    Cycling,
}

impl RoutingProfile {
    /// The default priority order for polyline requests.
    pub const PRIORITY: [RoutingProfile; 3] = [
        RoutingProfile::Driving,
        RoutingProfile::Walking,
        RoutingProfile::Cycling,
    ];

    /// OpenRouteService profile identifier.
    pub fn ors_profile(&self) -> &'static str {
        match self {
            RoutingProfile::Driving => "driving-car",
            RoutingProfile::Walking => "foot-walking",
            RoutingProfile::Cycling => "cycling-regular",
        }
    }
}

/// One planned route to an alternative destination.
#[derive(Debug, Clone, Serialize)]
pub struct AlternativeRoute {
    /// The ranked alternative this route leads to.
    pub destination: SimilarityHit,
    /// Ordered scenic waypoints between start and destination.
    pub waypoints: Vec<PoiRecord>,
    /// Route polyline as lat/lon points, start to destination.
    pub polyline: Vec<Coordinates>,
    /// Profile that produced the polyline, if routing succeeded.
    pub profile: Option<RoutingProfile>,
    /// Extra distance (km) attributable to the waypoints, relative to the
    /// direct start-to-destination distance. Observability only.
    pub estimated_detour_km: f64,
    /// True when all routing profiles failed and the polyline is the
    /// straight-line fallback through the waypoints.
    pub is_fallback_path: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_identifiers() {
        assert_eq!(RoutingProfile::Driving.ors_profile(), "driving-car");
        assert_eq!(RoutingProfile::Walking.ors_profile(), "foot-walking");
        assert_eq!(RoutingProfile::Cycling.ors_profile(), "cycling-regular");
    }

    #[test]
    fn priority_starts_with_driving() {
        assert_eq!(RoutingProfile::PRIORITY[0], RoutingProfile::Driving);
    }
}
