//! External collaborator contracts and their default client implementations.
//!
//! The core engine only depends on the traits defined here; the concrete
//! clients (Nominatim, Overpass, OpenRouteService, WMS relief) are reference
//! implementations. Tests inject in-memory fakes.

pub mod nominatim;
pub mod orchestrator;
pub mod ors;
pub mod overpass;
pub mod relief;

pub use nominatim::NominatimResolver;
pub use orchestrator::AlternativesOrchestrator;
pub use ors::OrsClient;
pub use overpass::OverpassDiscovery;
pub use relief::WmsReliefClient;

use crate::error::Result;
use crate::models::{Coordinates, PoiRecord, RoutingProfile};
use async_trait::async_trait;

/// Maps descriptive text to fixed-dimension, unit-normalized vectors.
/// A given instance must keep its dimension stable across calls.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Resolves a free-text place name to a POI record, or `None` when no match
/// is found. The returned category is already one of the coarse labels.
#[async_trait]
pub trait PoiResolver: Send + Sync {
    async fn resolve(&self, name: &str, hint: Option<&str>) -> Result<Option<PoiRecord>>;
}

/// Discovers POIs around a center point. May return duplicates; deduplication
/// is the engine's job. Unreachable sources yield an empty list, not an error.
#[async_trait]
pub trait PoiDiscovery: Send + Sync {
    async fn discover(
        &self,
        center: &Coordinates,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<PoiRecord>>;
}

/// Best-effort terrain signal: whether the surroundings of a point show
/// steep relief. Failures read as flat.
#[async_trait]
pub trait ReliefHeuristic: Send + Sync {
    async fn is_steep_relief(&self, coordinates: &Coordinates) -> bool;
}

/// Computes a route polyline through an ordered list of points.
#[async_trait]
pub trait RoutingEngine: Send + Sync {
    async fn route(
        &self,
        points: &[Coordinates],
        profile: RoutingProfile,
    ) -> Result<Vec<Coordinates>>;
}
