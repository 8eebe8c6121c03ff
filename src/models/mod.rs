mod coordinates;
mod geo;
mod poi;
mod route;

pub use coordinates::Coordinates;
pub use geo::BoundingBox;
pub use poi::{PoiCategory, PoiRecord, SimilarityHit};
pub use route::{AlternativeRoute, RoutingProfile};
