// Library exports for the alternative-destination ranking engine

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod route;
pub mod services;
pub mod similarity;

// Re-export commonly used types
pub use config::{Config, RankerConfig, SelectorConfig};
pub use error::{AppError, Result};
pub use models::{
    AlternativeRoute, Coordinates, PoiCategory, PoiRecord, RoutingProfile, SimilarityHit,
};
pub use route::WaypointSelector;
pub use services::AlternativesOrchestrator;
pub use similarity::SimilarityRanker;
