use crate::config::SelectorConfig;
use crate::constants::KM_PER_DEGREE;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, PoiRecord};
use std::collections::HashSet;

/// Selects an ordered set of scenic waypoints along the corridor between a
/// start and end coordinate.
///
/// Candidates come from an external discovery source and may lie anywhere in
/// the area. Selection guarantees the *progressive approach* invariant: no
/// kept waypoint moves farther from the destination than the previous one by
/// more than the configured tolerance. Lateral detours are unbounded.
pub struct WaypointSelector {
    config: SelectorConfig,
}

impl WaypointSelector {
    pub fn new(config: SelectorConfig) -> Self {
        WaypointSelector { config }
    }

    /// Select up to `max_pois` waypoints between `start` and `end`.
    ///
    /// Steps: annotate candidates with their corridor projection and
    /// distance to destination, order by corridor position, drop candidates
    /// that regress toward the destination beyond the tolerance, then
    /// distribute the final picks across equal-width corridor segments to
    /// avoid clustering. The returned list is ordered by corridor position
    /// and re-checked against the progressive invariant.
    ///
    /// An empty candidate pool yields an empty list, never an error.
    pub fn select_waypoints(
        &self,
        start: &Coordinates,
        end: &Coordinates,
        candidates: Vec<PoiRecord>,
        max_pois: usize,
    ) -> Result<Vec<PoiRecord>> {
        if max_pois == 0 {
            return Err(AppError::InvalidRequest(
                "max_pois must be at least 1".to_string(),
            ));
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut annotated = self.annotate(start, end, candidates);
        annotated.sort_by(|a, b| {
            let pa = a.position_along_route.unwrap_or(0.0);
            let pb = b.position_along_route.unwrap_or(0.0);
            pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let direct_distance = start.distance_to(end);
        let before_filter = annotated.len();
        let mut progressive = self.progressive_filter(annotated, direct_distance);
        tracing::info!(
            candidates = before_filter,
            kept = progressive.len(),
            tolerance_km = self.config.tolerance_km,
            "Progressive filter: {} candidates -> {} within {}km tolerance",
            before_filter,
            progressive.len(),
            self.config.tolerance_km
        );

        // Bias slot filling toward scenic value: scored candidates first,
        // best score first, without disturbing relative order otherwise.
        // The final list is re-sorted by position, so this only affects
        // which candidates win contested slots.
        if progressive.iter().any(|p| p.score.is_some()) {
            let (scored, unscored): (Vec<_>, Vec<_>) =
                progressive.into_iter().partition(|p| p.score.is_some());
            let mut scored = scored;
            scored.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            progressive = scored;
            progressive.extend(unscored);
        }

        let mut selected = if progressive.len() > max_pois {
            self.distribute_across_segments(progressive, max_pois)
        } else {
            progressive
        };
        selected.sort_by(|a, b| {
            let pa = a.position_along_route.unwrap_or(0.0);
            let pb = b.position_along_route.unwrap_or(0.0);
            pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
        });

        // Closing invariant: distribution must never reintroduce a
        // backtracking violation.
        let selected = self.progressive_filter(selected, direct_distance);

        let detour_km = Self::estimate_detour_km(start, end, &selected);
        tracing::info!(
            waypoints = selected.len(),
            route_km = %format!("{:.1}", direct_distance),
            detour_km = %format!("{:.1}", detour_km),
            "Selected {} waypoints (direct {:.1}km, estimated detour {:.1}km)",
            selected.len(),
            direct_distance,
            detour_km
        );

        Ok(selected)
    }

    /// Remove near-duplicate POIs by snapping coordinates to a grid of the
    /// configured threshold (~100 m by default). First occurrence wins.
    pub fn deduplicate(&self, pois: Vec<PoiRecord>) -> Vec<PoiRecord> {
        let threshold_deg = self.config.dedup_threshold_m / (KM_PER_DEGREE * 1000.0);
        let mut seen = HashSet::new();
        let before = pois.len();

        let unique: Vec<PoiRecord> = pois
            .into_iter()
            .filter(|poi| {
                let key = (
                    (poi.coordinates.lat / threshold_deg).round() as i64,
                    (poi.coordinates.lon / threshold_deg).round() as i64,
                );
                seen.insert(key)
            })
            .collect();

        if unique.len() < before {
            tracing::debug!(
                "Deduplicated {} POIs to {} at {}m grid",
                before,
                unique.len(),
                self.config.dedup_threshold_m
            );
        }
        unique
    }

    /// Extra distance attributable to the waypoints: chained distance
    /// start -> w1 -> .. -> end minus the direct distance. Observability
    /// only, never used to reject a route.
    pub fn estimate_detour_km(
        start: &Coordinates,
        end: &Coordinates,
        waypoints: &[PoiRecord],
    ) -> f64 {
        if waypoints.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        let mut previous = *start;
        for poi in waypoints {
            total += previous.distance_to(&poi.coordinates);
            previous = poi.coordinates;
        }
        total += previous.distance_to(end);

        total - start.distance_to(end)
    }

    /// Attach `position_along_route` (corridor projection parameter) and
    /// `distance_to_destination_km` (great-circle distance to `end`) to every
    /// candidate. The two distances are deliberately distinct: the projection
    /// orders candidates, the destination distance drives the progressive
    /// filter.
    fn annotate(
        &self,
        start: &Coordinates,
        end: &Coordinates,
        candidates: Vec<PoiRecord>,
    ) -> Vec<PoiRecord> {
        candidates
            .into_iter()
            .map(|mut poi| {
                let (_, t) = poi.coordinates.project_onto_segment(start, end);
                poi.position_along_route = Some(t);
                poi.distance_to_destination_km = Some(poi.coordinates.distance_to(end));
                poi
            })
            .collect()
    }

    /// Keep only candidates that approach the destination monotonically,
    /// within the tolerance. `current` starts at the direct start-to-end
    /// distance and ratchets down as candidates are kept.
    fn progressive_filter(&self, pois: Vec<PoiRecord>, start_distance: f64) -> Vec<PoiRecord> {
        let tolerance = self.config.tolerance_km;
        let mut current = start_distance;
        let mut kept = Vec::with_capacity(pois.len());

        for poi in pois {
            let Some(distance) = poi.distance_to_destination_km else {
                continue;
            };
            if distance <= current + tolerance {
                current = current.min(distance + tolerance);
                kept.push(poi);
            }
        }
        kept
    }

    /// Distribute `max_pois` picks across equal-width corridor segments.
    ///
    /// Each non-empty segment contributes its best candidate (highest score,
    /// ties to the smallest position); leftover slots are filled with the
    /// next-best unpicked candidates. Missing scores rank as -1 with a
    /// lat/lon tie-break for determinism.
    fn distribute_across_segments(
        &self,
        pois: Vec<PoiRecord>,
        max_pois: usize,
    ) -> Vec<PoiRecord> {
        let segment_width = 1.0 / max_pois as f64;
        let mut segments: Vec<Vec<PoiRecord>> = (0..max_pois).map(|_| Vec::new()).collect();

        for poi in pois {
            let position = poi.position_along_route.unwrap_or(0.0);
            let idx = ((position / segment_width) as usize).min(max_pois - 1);
            segments[idx].push(poi);
        }

        let mut selected: Vec<PoiRecord> = Vec::with_capacity(max_pois);
        let mut leftovers: Vec<PoiRecord> = Vec::new();
        for mut segment in segments {
            if segment.is_empty() {
                continue;
            }
            segment.sort_by(|a, b| Self::fill_order(a, b));
            let mut iter = segment.into_iter();
            if let Some(best) = iter.next() {
                selected.push(best);
            }
            leftovers.extend(iter);
        }

        if selected.len() < max_pois {
            leftovers.sort_by(|a, b| Self::fill_order(a, b));
            let missing = max_pois - selected.len();
            selected.extend(leftovers.into_iter().take(missing));
        }

        selected
    }

    /// Ordering for contested slots: score descending (missing score reads
    /// as -1), then position ascending, then lat/lon for determinism.
    fn fill_order(a: &PoiRecord, b: &PoiRecord) -> std::cmp::Ordering {
        let score_a = a.score.unwrap_or(-1.0);
        let score_b = b.score.unwrap_or(-1.0);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let pa = a.position_along_route.unwrap_or(0.0);
                let pb = b.position_along_route.unwrap_or(0.0);
                pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                a.coordinates
                    .lat
                    .partial_cmp(&b.coordinates.lat)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                a.coordinates
                    .lon
                    .partial_cmp(&b.coordinates.lon)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
