use crate::cache::EmbeddingCache;
use crate::config::RankerConfig;
use crate::constants::DEDUP_COORD_DECIMALS;
use crate::error::{AppError, Result};
use crate::models::{BoundingBox, Coordinates, PoiCategory, PoiRecord, SimilarityHit};
use crate::services::{Embedder, ReliefHeuristic};
use crate::similarity::index::EmbeddingIndex;
use crate::similarity::scenic::scenic_boost;
use crate::similarity::text::poi_text;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Category-bucketed similarity ranker over a regional candidate pool.
///
/// Two-phase: [`build_index`](SimilarityRanker::build_index) groups the pool
/// into per-category embedding indices, then
/// [`find_similar`](SimilarityRanker::find_similar) fans a query out across
/// equivalent buckets and fuses cosine similarity with the scenic heuristic.
/// One ranker serves one request; buckets are discarded with it.
pub struct SimilarityRanker {
    config: RankerConfig,
    embedder: Arc<dyn Embedder>,
    cache: Arc<dyn EmbeddingCache>,
    relief: Arc<dyn ReliefHeuristic>,
    user_center: Option<Coordinates>,
    buckets: HashMap<PoiCategory, EmbeddingIndex>,
}

impl SimilarityRanker {
    pub fn new(
        config: RankerConfig,
        embedder: Arc<dyn Embedder>,
        cache: Arc<dyn EmbeddingCache>,
        relief: Arc<dyn ReliefHeuristic>,
    ) -> Self {
        SimilarityRanker {
            config,
            embedder,
            cache,
            relief,
            user_center: None,
            buckets: HashMap::new(),
        }
    }

    /// Phase A: bucket the regional pool by coarse category and build one
    /// embedding index per non-empty bucket.
    ///
    /// Candidates beyond `radius_km` of `user_center` are dropped up front.
    /// An embedder failure aborts the whole build (all-or-nothing per
    /// bucket), leaving the ranker without indices.
    pub async fn build_index(
        &mut self,
        regional_pois: &[PoiRecord],
        user_center: Coordinates,
    ) -> Result<()> {
        self.user_center = Some(user_center);
        self.buckets.clear();

        // Coarse box check first, exact distance only for survivors.
        let bbox = BoundingBox::from_center_radius(&user_center, self.config.radius_km);
        let mut grouped: HashMap<PoiCategory, Vec<PoiRecord>> = HashMap::new();
        let mut dropped_outside = 0usize;
        for poi in regional_pois {
            if !bbox.contains(&poi.coordinates)
                || poi.coordinates.distance_to(&user_center) > self.config.radius_km
            {
                dropped_outside += 1;
                continue;
            }
            grouped.entry(poi.category).or_default().push(poi.clone());
        }

        tracing::info!(
            pool = regional_pois.len(),
            outside_radius = dropped_outside,
            buckets = grouped.len(),
            radius_km = self.config.radius_km,
            "Building similarity index: {} candidates, {} outside {}km, {} buckets",
            regional_pois.len(),
            dropped_outside,
            self.config.radius_km,
            grouped.len()
        );

        for (category, items) in grouped {
            let texts: Vec<String> = items.iter().map(poi_text).collect();
            let mut index = EmbeddingIndex::new(self.embedder.clone(), self.cache.clone());
            index.build(items, &texts).await.map_err(|e| {
                self.buckets.clear();
                tracing::warn!("Bucket build failed for {}: {}", category, e);
                e
            })?;
            tracing::debug!("Built {} bucket with {} members", category, index.len());
            self.buckets.insert(category, index);
        }

        Ok(())
    }

    /// Phase B: rank alternatives for a query POI.
    ///
    /// Searches every bucket whose equivalence set overlaps the query's
    /// category, deduplicates across buckets (first occurrence wins),
    /// re-applies the radius filter, suppresses the query itself, and scores
    /// survivors with `alpha * clamp01(cosine) + (1 - alpha) * scenic_boost`.
    pub async fn find_similar(
        &self,
        query: &PoiRecord,
        top_k: usize,
    ) -> Result<Vec<SimilarityHit>> {
        if top_k == 0 {
            return Err(AppError::InvalidRequest(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.buckets.is_empty() {
            return Err(AppError::IndexNotBuilt(
                "no category buckets built; call build_index first".to_string(),
            ));
        }

        let per_bucket = std::cmp::max(30, top_k * 5);
        let query_text = poi_text(query);

        let mut hits: Vec<(PoiRecord, f64)> = Vec::new();
        for category in query.category.matching_buckets() {
            // Absent buckets are skipped silently: the region simply has no
            // POIs of that kind.
            let Some(index) = self.buckets.get(&category) else {
                continue;
            };
            let bucket_hits = index.search(&query_text, per_bucket).await?;
            tracing::debug!(
                "Bucket {} returned {} hits for '{}'",
                category,
                bucket_hits.len(),
                query.name
            );
            hits.extend(bucket_hits);
        }

        // Dedup across buckets, first occurrence wins.
        let mut seen = HashSet::new();
        let mut dedup: Vec<(PoiRecord, f64)> = Vec::new();
        for (poi, cosine) in hits {
            if seen.insert(poi.dedup_key(DEDUP_COORD_DECIMALS)) {
                dedup.push((poi, cosine));
            }
        }

        // Radius re-check defends against buckets built for another center.
        let query_key = query.location_key(DEDUP_COORD_DECIMALS);
        let mut scored: Vec<SimilarityHit> = Vec::new();
        for (poi, cosine) in dedup {
            if let Some(center) = self.user_center {
                if poi.coordinates.distance_to(&center) > self.config.radius_km {
                    continue;
                }
            }
            if poi.location_key(DEDUP_COORD_DECIMALS) == query_key {
                continue;
            }

            let boost = scenic_boost(&poi, self.relief.as_ref()).await;
            let final_score =
                self.config.alpha * cosine.clamp(0.0, 1.0) + (1.0 - self.config.alpha) * boost;

            let mut poi = poi;
            poi.score = Some(final_score);
            scored.push(SimilarityHit {
                poi,
                cosine,
                final_score,
            });
        }

        // Stable sort: ties keep input order, no extra tie-break rule.
        scored.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        tracing::info!(
            query = %query.name,
            results = scored.len(),
            "Ranked {} alternatives for '{}'",
            scored.len(),
            query.name
        );
        Ok(scored)
    }

    /// Whether phase A has produced at least one bucket.
    pub fn is_built(&self) -> bool {
        !self.buckets.is_empty()
    }
}
