use crate::models::{PoiCategory, PoiRecord};

/// Tag keys excluded from the embedded text: administrative noise that
/// carries no scenic signal and destabilizes the cache key.
const NOISY_TAG_KEYS: &[&str] = &[
    "source",
    "check_date",
    "wikidata",
    "website",
    "image",
    "note",
    "start_date",
    "operator",
    "phone",
    "contact:phone",
    "contact:website",
    "email",
    "addr:full",
];

/// Canonical descriptive text for a POI, fed to the embedder.
///
/// Shape: `[category: <cat>] [tags: k=v; ..] — <description>`, lower-cased.
/// Tags are sorted by key so identical POIs always canonicalize to the same
/// string regardless of map iteration order. POIs without a narrative
/// description get a category-default one so every bucket member embeds to
/// something meaningful.
pub fn poi_text(poi: &PoiRecord) -> String {
    let mut tag_pairs: Vec<(&String, &String)> = poi
        .tags
        .iter()
        .filter(|(k, _)| !NOISY_TAG_KEYS.contains(&k.as_str()))
        .collect();
    tag_pairs.sort_by(|a, b| a.0.cmp(b.0));

    let tag_text = tag_pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ");

    let description = poi
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| default_description(poi.category));

    format!(
        "[category: {}] [tags: {}] — {}",
        poi.category, tag_text, description
    )
    .to_lowercase()
}

fn default_description(category: PoiCategory) -> &'static str {
    match category {
        PoiCategory::Lake => "clear waters, forest-lined shores, alpine setting",
        PoiCategory::Waterfall => "vertical drop, rocky gorge, steady plunge",
        PoiCategory::Beach => "sandy shore, gentle surf, unspoiled feel",
        PoiCategory::Viewpoint => "elevated panorama, distant peaks, wide vistas",
        PoiCategory::Park => "protected nature, woodland trails, quiet atmosphere",
        PoiCategory::Castle => "historic walls, hilltop site, scenic surroundings",
        PoiCategory::Church => "landmark spire, heritage architecture, scenic setting",
        PoiCategory::Museum => "regional heritage, curated exhibits, cultural focus",
        PoiCategory::Unknown => "scenic natural site, tranquil setting",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use std::collections::HashMap;

    fn poi(category: PoiCategory) -> PoiRecord {
        PoiRecord::new(
            "Test".to_string(),
            Coordinates::new(47.0, 12.0).unwrap(),
            category,
        )
    }

    #[test]
    fn includes_category_and_default_description() {
        let text = poi_text(&poi(PoiCategory::Lake));
        assert!(text.starts_with("[category: lake]"));
        assert!(text.contains("clear waters"));
    }

    #[test]
    fn uses_narrative_description_when_present() {
        let p = poi(PoiCategory::Lake).with_description("A glacial lake beneath steep walls.");
        let text = poi_text(&p);
        assert!(text.contains("a glacial lake beneath steep walls."));
        assert!(!text.contains("clear waters"));
    }

    #[test]
    fn excludes_noisy_tags_and_sorts_the_rest() {
        let mut tags = HashMap::new();
        tags.insert("website".to_string(), "https://example.org".to_string());
        tags.insert("natural".to_string(), "water".to_string());
        tags.insert("boundary".to_string(), "protected_area".to_string());
        let p = poi(PoiCategory::Lake).with_tags(tags);

        let text = poi_text(&p);
        assert!(!text.contains("website"));
        assert!(text.contains("boundary=protected_area; natural=water"));
    }

    #[test]
    fn canonicalization_is_deterministic() {
        let mut tags = HashMap::new();
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")] {
            tags.insert(k.to_string(), v.to_string());
        }
        let p = poi(PoiCategory::Park).with_tags(tags);
        assert_eq!(poi_text(&p), poi_text(&p.clone()));
    }

    #[test]
    fn output_is_lowercase() {
        let p = poi(PoiCategory::Castle).with_description("A HISTORIC Fortress");
        assert_eq!(poi_text(&p), poi_text(&p).to_lowercase());
    }
}
