use crate::constants::KM_PER_DEGREE;
use crate::models::Coordinates;

/// Axis-aligned bounding box in geographic coordinates.
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Compute a bounding box around a center point with a radius in km.
    ///
    /// Uses the flat-earth approximation `lat_delta = radius / 111` and
    /// `lon_delta = radius / (111 * cos(lat))`. Above |lat| = 85 the cosine
    /// blows up, so the longitude delta falls back to the latitude delta;
    /// the resulting box is a known, accepted approximation near the poles.
    pub fn from_center_radius(center: &Coordinates, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lon_delta = if center.lat.abs() > 85.0 {
            lat_delta
        } else {
            radius_km / (KM_PER_DEGREE * center.lat.to_radians().cos())
        };

        BoundingBox {
            min_lat: center.lat - lat_delta,
            max_lat: center.lat + lat_delta,
            min_lon: center.lon - lon_delta,
            max_lon: center.lon + lon_delta,
        }
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn center_radius_basic() {
        let center = c(48.8566, 2.3522);
        let bbox = BoundingBox::from_center_radius(&center, 1.0);
        let lat_delta = 1.0 / 111.0;
        assert!((bbox.min_lat - (48.8566 - lat_delta)).abs() < 1e-10);
        assert!((bbox.max_lat - (48.8566 + lat_delta)).abs() < 1e-10);
        assert!(bbox.min_lon < 2.3522);
        assert!(bbox.max_lon > 2.3522);
    }

    #[test]
    fn lon_delta_widens_at_higher_latitude() {
        let bbox_eq = BoundingBox::from_center_radius(&c(1.0, 10.0), 1.0);
        let bbox_60 = BoundingBox::from_center_radius(&c(60.0, 10.0), 1.0);

        let lon_delta_eq = bbox_eq.max_lon - 10.0;
        let lon_delta_60 = bbox_60.max_lon - 10.0;
        assert!(
            lon_delta_60 > lon_delta_eq,
            "lon_delta_60={lon_delta_60}, lon_delta_eq={lon_delta_eq}"
        );
    }

    #[test]
    fn center_radius_near_poles() {
        let bbox = BoundingBox::from_center_radius(&c(86.0, 10.0), 1.0);
        let lat_delta = 1.0 / 111.0;
        let lon_delta = bbox.max_lon - 10.0;
        assert!(
            (lon_delta - lat_delta).abs() < 1e-10,
            "near-pole: lon_delta={lon_delta}, lat_delta={lat_delta}"
        );
    }

    #[test]
    fn contains_boundary_points() {
        let bbox = BoundingBox::from_center_radius(&c(48.0, 2.0), 10.0);
        assert!(bbox.contains(&c(48.0, 2.0)));
        assert!(!bbox.contains(&c(49.0, 2.0)));
    }
}
