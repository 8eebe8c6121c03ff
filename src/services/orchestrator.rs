use crate::cache::EmbeddingCache;
use crate::config::{RankerConfig, SelectorConfig};
use crate::constants::{
    DISCOVERY_POOL_MULTIPLIER, DISCOVERY_RADIUS_MAX_KM, DISCOVERY_RADIUS_MIN_KM,
};
use crate::error::{AppError, Result};
use crate::models::{AlternativeRoute, Coordinates, PoiRecord, RoutingProfile, SimilarityHit};
use crate::route::WaypointSelector;
use crate::services::{Embedder, PoiDiscovery, PoiResolver, ReliefHeuristic, RoutingEngine};
use crate::similarity::SimilarityRanker;
use std::sync::Arc;

/// Top-level composition: resolve a viral target, rank locally-reachable
/// alternatives, and plan a scenic waypoint route to each.
///
/// Once the target resolves, every later failure degrades instead of
/// erroring: ranking falls back to unscored candidate order, discovery
/// failures read as an empty corridor, and routing failures produce a
/// straight-line path. The caller always gets a navigable plan.
pub struct AlternativesOrchestrator {
    ranker_config: RankerConfig,
    selector: WaypointSelector,
    embedder: Arc<dyn Embedder>,
    cache: Arc<dyn EmbeddingCache>,
    relief: Arc<dyn ReliefHeuristic>,
    resolver: Arc<dyn PoiResolver>,
    discovery: Arc<dyn PoiDiscovery>,
    router: Arc<dyn RoutingEngine>,
}

impl AlternativesOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ranker_config: RankerConfig,
        selector_config: SelectorConfig,
        embedder: Arc<dyn Embedder>,
        cache: Arc<dyn EmbeddingCache>,
        relief: Arc<dyn ReliefHeuristic>,
        resolver: Arc<dyn PoiResolver>,
        discovery: Arc<dyn PoiDiscovery>,
        router: Arc<dyn RoutingEngine>,
    ) -> Self {
        AlternativesOrchestrator {
            ranker_config,
            selector: WaypointSelector::new(selector_config),
            embedder,
            cache,
            relief,
            resolver,
            discovery,
            router,
        }
    }

    /// Rank alternatives to `target` from the regional pool.
    ///
    /// Embedding or index failures degrade to the first `top_k` candidates
    /// in their original order, unscored; only invalid arguments propagate.
    pub async fn rank_alternatives(
        &self,
        user_center: Coordinates,
        target: &PoiRecord,
        regional_candidates: &[PoiRecord],
    ) -> Result<Vec<SimilarityHit>> {
        let mut ranker = SimilarityRanker::new(
            self.ranker_config.clone(),
            self.embedder.clone(),
            self.cache.clone(),
            self.relief.clone(),
        );

        let ranked = match ranker.build_index(regional_candidates, user_center).await {
            Ok(()) if ranker.is_built() => {
                ranker
                    .find_similar(target, self.ranker_config.top_k)
                    .await
            }
            // Build succeeded but the radius filter emptied every bucket.
            Ok(()) => Err(AppError::IndexNotBuilt(
                "no candidates within the search radius".to_string(),
            )),
            Err(e) => Err(e),
        };

        match ranked {
            Ok(hits) => Ok(hits),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    "Similarity ranking failed ({}); falling back to unscored candidate order",
                    e
                );
                Ok(regional_candidates
                    .iter()
                    .take(self.ranker_config.top_k)
                    .cloned()
                    .map(|poi| SimilarityHit {
                        poi,
                        cosine: 0.0,
                        final_score: 0.0,
                    })
                    .collect())
            }
            Err(e) => Err(e),
        }
    }

    /// Full pipeline: resolve the target, rank alternatives, and plan a
    /// scenic route to each.
    ///
    /// Failing to resolve the target itself is the one fatal error
    /// (`TargetUnresolved`); everything downstream degrades.
    pub async fn plan_alternative_routes(
        &self,
        user_start: Coordinates,
        target_name: &str,
        target_hint: Option<&str>,
        regional_candidates: &[PoiRecord],
    ) -> Result<Vec<AlternativeRoute>> {
        let target = self
            .resolver
            .resolve(target_name, target_hint)
            .await
            .map_err(|e| AppError::TargetUnresolved(format!("{}: {}", target_name, e)))?
            .ok_or_else(|| {
                AppError::TargetUnresolved(format!("no match for '{}'", target_name))
            })?;

        tracing::info!(
            name = %target.name,
            category = %target.category,
            "Resolved target '{}' ({}) at ({:.4}, {:.4})",
            target.name,
            target.category,
            target.coordinates.lat,
            target.coordinates.lon
        );

        let alternatives = self
            .rank_alternatives(user_start, &target, regional_candidates)
            .await?;

        // Route planning per alternative is independent; run them together.
        let route_futures = alternatives
            .into_iter()
            .map(|alternative| self.plan_route_to(user_start, alternative));
        futures::future::join_all(route_futures)
            .await
            .into_iter()
            .collect()
    }

    /// Plan one route: discover corridor POIs, select waypoints, route.
    async fn plan_route_to(
        &self,
        user_start: Coordinates,
        destination: SimilarityHit,
    ) -> Result<AlternativeRoute> {
        let dest_coords = destination.poi.coordinates;
        let route_distance = user_start.distance_to(&dest_coords);
        let max_pois = waypoint_budget(route_distance);

        let pool = self.discover_corridor_pool(&user_start, &dest_coords, max_pois).await;
        let pool = self.selector.deduplicate(pool);
        let waypoints =
            self.selector
                .select_waypoints(&user_start, &dest_coords, pool, max_pois)?;
        let estimated_detour_km =
            WaypointSelector::estimate_detour_km(&user_start, &dest_coords, &waypoints);

        let mut points: Vec<Coordinates> = Vec::with_capacity(waypoints.len() + 2);
        points.push(user_start);
        points.extend(waypoints.iter().map(|w| w.coordinates));
        points.push(dest_coords);

        let (polyline, profile, is_fallback_path) = self.route_with_fallback(&points).await;

        Ok(AlternativeRoute {
            destination,
            waypoints,
            polyline,
            profile,
            estimated_detour_km,
            is_fallback_path,
        })
    }

    /// Discover candidate POIs around the corridor midpoint. Failures read
    /// as an empty area.
    async fn discover_corridor_pool(
        &self,
        start: &Coordinates,
        end: &Coordinates,
        max_pois: usize,
    ) -> Vec<PoiRecord> {
        let midpoint = Coordinates {
            lat: (start.lat + end.lat) / 2.0,
            lon: (start.lon + end.lon) / 2.0,
        };
        let radius_km = (start.distance_to(end) * 0.5)
            .clamp(DISCOVERY_RADIUS_MIN_KM, DISCOVERY_RADIUS_MAX_KM);
        let limit = max_pois * DISCOVERY_POOL_MULTIPLIER;

        match self.discovery.discover(&midpoint, radius_km, limit).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(
                    "Corridor discovery failed ({}); continuing without waypoints",
                    e
                );
                Vec::new()
            }
        }
    }

    /// Try each routing profile in priority order; fall back to straight
    /// segments through the points when all fail. The fallback is a
    /// correctness guarantee: a selected destination always gets *some*
    /// navigable path.
    async fn route_with_fallback(
        &self,
        points: &[Coordinates],
    ) -> (Vec<Coordinates>, Option<RoutingProfile>, bool) {
        for profile in RoutingProfile::PRIORITY {
            match self.router.route(points, profile).await {
                Ok(polyline) if !polyline.is_empty() => {
                    tracing::info!(
                        profile = profile.ors_profile(),
                        points = polyline.len(),
                        "Routed with profile {} ({} points)",
                        profile.ors_profile(),
                        polyline.len()
                    );
                    return (polyline, Some(profile), false);
                }
                Ok(_) => {
                    tracing::warn!(
                        "Routing profile {} returned an empty polyline",
                        profile.ors_profile()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Routing profile {} failed: {}",
                        profile.ors_profile(),
                        e
                    );
                }
            }
        }

        tracing::warn!(
            "All routing profiles failed; using straight-line fallback with {} points",
            points.len()
        );
        (points.to_vec(), None, true)
    }
}

/// Dynamic waypoint budget by route distance.
fn waypoint_budget(route_distance_km: f64) -> usize {
    if route_distance_km < 50.0 {
        2
    } else if route_distance_km < 100.0 {
        3
    } else {
        5
    }
}
