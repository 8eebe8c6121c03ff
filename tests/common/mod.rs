use async_trait::async_trait;
use sidetrip::cache::MemoryEmbeddingCache;
use sidetrip::error::{AppError, Result};
use sidetrip::models::{Coordinates, PoiCategory, PoiRecord, RoutingProfile};
use sidetrip::services::{Embedder, PoiDiscovery, PoiResolver, ReliefHeuristic, RoutingEngine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary; `RUST_LOG` filters output.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic embedder: equal texts map to equal vectors, different texts
/// to different ones. Good enough to exercise ranking order without a model.
#[allow(dead_code)]
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = [0.0f32; 16];
                for (i, b) in t.bytes().enumerate() {
                    v[i % 16] += b as f32 / 255.0;
                }
                v.to_vec()
            })
            .collect())
    }
}

/// Embedder that always fails; drives the degraded ranking path.
#[allow(dead_code)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::Embedding("model unavailable".to_string()))
    }
}

/// Flat terrain everywhere.
#[allow(dead_code)]
pub struct FlatRelief;

#[async_trait]
impl ReliefHeuristic for FlatRelief {
    async fn is_steep_relief(&self, _coordinates: &Coordinates) -> bool {
        false
    }
}

/// Resolver backed by a fixed record; `None` simulates an unknown name.
#[allow(dead_code)]
pub struct StaticResolver {
    pub record: Option<PoiRecord>,
}

#[async_trait]
impl PoiResolver for StaticResolver {
    async fn resolve(&self, _name: &str, _hint: Option<&str>) -> Result<Option<PoiRecord>> {
        Ok(self.record.clone())
    }
}

/// Discovery backed by a fixed pool, ignoring center and radius.
#[allow(dead_code)]
pub struct StaticDiscovery {
    pub pool: Vec<PoiRecord>,
}

#[async_trait]
impl PoiDiscovery for StaticDiscovery {
    async fn discover(
        &self,
        _center: &Coordinates,
        _radius_km: f64,
        limit: usize,
    ) -> Result<Vec<PoiRecord>> {
        Ok(self.pool.iter().take(limit).cloned().collect())
    }
}

/// Discovery source that is always down.
#[allow(dead_code)]
pub struct FailingDiscovery;

#[async_trait]
impl PoiDiscovery for FailingDiscovery {
    async fn discover(
        &self,
        _center: &Coordinates,
        _radius_km: f64,
        _limit: usize,
    ) -> Result<Vec<PoiRecord>> {
        Err(AppError::ExternalApi("all mirrors unreachable".to_string()))
    }
}

/// Echoes the requested points back as the polyline and records how many
/// profiles were tried before the first success.
#[allow(dead_code)]
pub struct EchoRouter {
    pub fail_profiles: Vec<RoutingProfile>,
    pub calls: AtomicUsize,
}

impl EchoRouter {
    #[allow(dead_code)]
    pub fn new() -> Self {
        EchoRouter {
            fail_profiles: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn failing_for(profiles: Vec<RoutingProfile>) -> Self {
        EchoRouter {
            fail_profiles: profiles,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RoutingEngine for EchoRouter {
    async fn route(
        &self,
        points: &[Coordinates],
        profile: RoutingProfile,
    ) -> Result<Vec<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_profiles.contains(&profile) {
            return Err(AppError::Routing(format!(
                "profile {} rejected",
                profile.ors_profile()
            )));
        }
        Ok(points.to_vec())
    }
}

/// Router with no reachable engine at all.
#[allow(dead_code)]
pub struct DownRouter;

#[async_trait]
impl RoutingEngine for DownRouter {
    async fn route(
        &self,
        _points: &[Coordinates],
        _profile: RoutingProfile,
    ) -> Result<Vec<Coordinates>> {
        Err(AppError::Routing("engine unreachable".to_string()))
    }
}

/// Small in-memory embedding cache for tests.
#[allow(dead_code)]
pub fn test_cache() -> Arc<MemoryEmbeddingCache> {
    Arc::new(MemoryEmbeddingCache::new(60, 1_000))
}

/// Create a named POI at a coordinate.
#[allow(dead_code)]
pub fn poi(name: &str, category: PoiCategory, lat: f64, lon: f64) -> PoiRecord {
    PoiRecord::new(
        name.to_string(),
        Coordinates::new(lat, lon).unwrap(),
        category,
    )
}
