use crate::constants::*;
use crate::models::{PoiCategory, PoiRecord};
use crate::services::ReliefHeuristic;

/// `natural=*` values that earn the scenic tag bonus.
const SCENIC_NATURAL_VALUES: &[&str] = &["water", "beach", "waterfall", "peak", "cliff", "wood"];

/// `leisure=*` values that earn the scenic tag bonus.
const SCENIC_LEISURE_VALUES: &[&str] = &["park", "nature_reserve", "garden"];

/// Bounded heuristic for visual/natural appeal, in `[0, 0.3]`.
///
/// Sums a category weight, tag bonuses, a protected-area bonus, and a
/// steep-relief bonus from the injected heuristic, then clamps. The relief
/// collaborator is best-effort: a failed or slow probe reads as flat terrain
/// and simply contributes nothing.
pub async fn scenic_boost(poi: &PoiRecord, relief: &dyn ReliefHeuristic) -> f64 {
    let mut boost = category_weight(poi.category);
    boost += tag_bonuses(poi);
    boost += protected_area_bonus(poi);

    if relief.is_steep_relief(&poi.coordinates).await {
        boost += SCENIC_STEEP_RELIEF_BONUS;
    }

    boost.clamp(0.0, SCENIC_BOOST_MAX)
}

fn category_weight(category: PoiCategory) -> f64 {
    match category {
        PoiCategory::Lake | PoiCategory::Waterfall | PoiCategory::Beach | PoiCategory::Viewpoint => {
            SCENIC_CATEGORY_WEIGHT_NATURAL
        }
        PoiCategory::Park => SCENIC_CATEGORY_WEIGHT_PARK,
        _ => 0.0,
    }
}

fn tag_bonuses(poi: &PoiRecord) -> f64 {
    let mut bonus = 0.0;
    if let Some(natural) = poi.tags.get("natural") {
        if SCENIC_NATURAL_VALUES.contains(&natural.to_lowercase().as_str()) {
            bonus += SCENIC_NATURAL_TAG_BONUS;
        }
    }
    if let Some(leisure) = poi.tags.get("leisure") {
        if SCENIC_LEISURE_VALUES.contains(&leisure.to_lowercase().as_str()) {
            bonus += SCENIC_LEISURE_TAG_BONUS;
        }
    }
    bonus
}

fn protected_area_bonus(poi: &PoiRecord) -> f64 {
    let tag = |key: &str| {
        poi.tags
            .get(key)
            .map(|v| v.to_lowercase())
            .unwrap_or_default()
    };

    if tag("boundary") == "protected_area" || !tag("protect_class").is_empty() {
        SCENIC_PROTECTED_AREA_BONUS
    } else if tag("leisure").contains("national_park") {
        SCENIC_NATIONAL_PARK_BONUS
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedRelief(bool);

    #[async_trait]
    impl ReliefHeuristic for FixedRelief {
        async fn is_steep_relief(&self, _coordinates: &Coordinates) -> bool {
            self.0
        }
    }

    fn poi(category: PoiCategory, tags: &[(&str, &str)]) -> PoiRecord {
        let tags: HashMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PoiRecord::new(
            "Test".to_string(),
            Coordinates::new(47.5, 12.9).unwrap(),
            category,
        )
        .with_tags(tags)
    }

    #[tokio::test]
    async fn museum_on_flat_ground_gets_nothing() {
        let boost = scenic_boost(&poi(PoiCategory::Museum, &[]), &FixedRelief(false)).await;
        assert_eq!(boost, 0.0);
    }

    #[tokio::test]
    async fn lake_category_weight() {
        let boost = scenic_boost(&poi(PoiCategory::Lake, &[]), &FixedRelief(false)).await;
        assert!((boost - 0.12).abs() < 1e-9);
    }

    #[tokio::test]
    async fn protected_lake_in_steep_terrain_hits_the_cap() {
        let p = poi(
            PoiCategory::Lake,
            &[("natural", "water"), ("boundary", "protected_area")],
        );
        // 0.12 + 0.03 + 0.07 + 0.1 = 0.32, clamped to 0.3
        let boost = scenic_boost(&p, &FixedRelief(true)).await;
        assert!((boost - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn national_park_leisure_gets_weaker_bonus() {
        let p = poi(PoiCategory::Unknown, &[("leisure", "national_park")]);
        let boost = scenic_boost(&p, &FixedRelief(false)).await;
        assert!((boost - 0.05).abs() < 1e-9);
    }

    #[tokio::test]
    async fn relief_bonus_is_additive() {
        let flat = scenic_boost(&poi(PoiCategory::Park, &[]), &FixedRelief(false)).await;
        let steep = scenic_boost(&poi(PoiCategory::Park, &[]), &FixedRelief(true)).await;
        assert!((steep - flat - 0.1).abs() < 1e-9);
    }
}
