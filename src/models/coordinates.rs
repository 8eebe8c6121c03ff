use crate::constants::{DEGENERATE_SEGMENT_EPSILON, EARTH_RADIUS_KM, KM_PER_DEGREE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lon
            ));
        }
        Ok(Coordinates { lat, lon })
    }

    /// Haversine great-circle distance in kilometers.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Round coordinates to specified decimal places for dedup keys.
    pub fn round(&self, decimal_places: u32) -> Self {
        let multiplier = 10_f64.powi(decimal_places as i32);
        Coordinates {
            lat: (self.lat * multiplier).round() / multiplier,
            lon: (self.lon * multiplier).round() / multiplier,
        }
    }

    /// Project this point onto the directed segment `a -> b`.
    ///
    /// Works in a local Cartesian frame: longitude deltas scaled by the
    /// cosine of the mean latitude, both axes by 111 km/degree. Returns
    /// `(perpendicular_distance_km, t)` where `t` in [0, 1] is the normalized
    /// position of the closest point along the segment (0 = `a`, 1 = `b`).
    /// The distance is the haversine distance to the projected point, not the
    /// planar one, so the final figure stays geodesically accurate.
    ///
    /// A degenerate segment (`a` ~ `b`) yields `t = 0` and the plain distance
    /// to `a`.
    pub fn project_onto_segment(&self, a: &Coordinates, b: &Coordinates) -> (f64, f64) {
        let mean_lat = ((a.lat + b.lat) / 2.0).to_radians();
        let lon_scale = KM_PER_DEGREE * mean_lat.cos();

        let dx = (b.lon - a.lon) * lon_scale;
        let dy = (b.lat - a.lat) * KM_PER_DEGREE;
        let px = (self.lon - a.lon) * lon_scale;
        let py = (self.lat - a.lat) * KM_PER_DEGREE;

        let segment_length_sq = dx * dx + dy * dy;
        if segment_length_sq < DEGENERATE_SEGMENT_EPSILON {
            return (self.distance_to(a), 0.0);
        }

        let t = ((px * dx + py * dy) / segment_length_sq).clamp(0.0, 1.0);

        let closest = Coordinates {
            lat: a.lat + t * (b.lat - a.lat),
            lon: a.lon + t * (b.lon - a.lon),
        };

        (self.distance_to(&closest), t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(48.8566, 2.3522).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err()); // Invalid lat
        assert!(Coordinates::new(0.0, 181.0).is_err()); // Invalid lon
    }

    #[test]
    fn test_distance_calculation() {
        let paris = Coordinates::new(48.8566, 2.3522).unwrap();
        let london = Coordinates::new(51.5074, -0.1278).unwrap();

        let distance = paris.distance_to(&london);
        // Paris to London is approximately 344 km
        assert!((distance - 344.0).abs() < 10.0);
    }

    #[test]
    fn test_rounding() {
        let coords = Coordinates::new(48.856614, 2.352222).unwrap();
        let rounded = coords.round(3);
        assert_eq!(rounded.lat, 48.857);
        assert_eq!(rounded.lon, 2.352);
    }

    #[test]
    fn test_projection_midpoint() {
        let a = Coordinates::new(48.8566, 2.3522).unwrap();
        let b = Coordinates::new(48.8600, 2.3600).unwrap();

        let midpoint = Coordinates::new(48.8583, 2.3561).unwrap();
        let (dist, t) = midpoint.project_onto_segment(&a, &b);
        assert!(dist < 0.1, "Midpoint should be close to segment");
        assert!((t - 0.5).abs() < 0.1, "Midpoint t should be around 0.5");
    }

    #[test]
    fn test_projection_clamps_before_start() {
        let a = Coordinates::new(48.0, 2.0).unwrap();
        let b = Coordinates::new(49.0, 2.0).unwrap();

        // Point south of the segment start projects onto the start itself.
        let point = Coordinates::new(47.5, 2.0).unwrap();
        let (dist, t) = point.project_onto_segment(&a, &b);
        assert_eq!(t, 0.0);
        assert!((dist - point.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_projection_clamps_after_end() {
        let a = Coordinates::new(48.0, 2.0).unwrap();
        let b = Coordinates::new(49.0, 2.0).unwrap();

        let point = Coordinates::new(49.5, 2.0).unwrap();
        let (_, t) = point.project_onto_segment(&a, &b);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn test_projection_degenerate_segment() {
        let a = Coordinates::new(48.0, 2.0).unwrap();
        let point = Coordinates::new(48.5, 2.0).unwrap();

        let (dist, t) = point.project_onto_segment(&a, &a);
        assert_eq!(t, 0.0);
        assert!((dist - point.distance_to(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_projection_perpendicular_distance_is_geodesic() {
        let a = Coordinates::new(48.0, 2.0).unwrap();
        let b = Coordinates::new(48.0, 3.0).unwrap();

        // ~0.1 deg north of the segment, roughly 11 km perpendicular.
        let point = Coordinates::new(48.1, 2.5).unwrap();
        let (dist, t) = point.project_onto_segment(&a, &b);
        assert!((t - 0.5).abs() < 0.05);
        assert!((dist - 11.1).abs() < 0.5, "got {dist}");
    }
}
