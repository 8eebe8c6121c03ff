use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of coarse POI categories the engine reasons about.
///
/// Raw category labels from collaborators are remapped onto these through
/// [`PoiCategory::from_subtype`]; anything unrecognized lands in `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PoiCategory {
    Lake,
    Waterfall,
    Beach,
    Viewpoint,
    Park,
    Castle,
    Church,
    Museum,
    Unknown,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 9] = [
        PoiCategory::Lake,
        PoiCategory::Waterfall,
        PoiCategory::Beach,
        PoiCategory::Viewpoint,
        PoiCategory::Park,
        PoiCategory::Castle,
        PoiCategory::Church,
        PoiCategory::Museum,
        PoiCategory::Unknown,
    ];

    /// Subtype labels considered equivalent to this coarse category.
    /// The coarse label itself is always a member of its own set.
    pub fn subtypes(&self) -> &'static [&'static str] {
        match self {
            PoiCategory::Lake => &[
                "lake",
                "lagoon",
                "reservoir",
                "pond",
                "fjord",
                "glacial_lake",
                "crater_lake",
            ],
            PoiCategory::Waterfall => &["waterfall", "cascade"],
            PoiCategory::Beach => &["beach", "bay", "shore", "coastline"],
            PoiCategory::Viewpoint => &["viewpoint", "peak", "summit", "overlook", "cliff"],
            PoiCategory::Park => &["park", "protected_area", "nature_reserve"],
            PoiCategory::Castle => &["castle", "fortress"],
            PoiCategory::Church => &["church", "cathedral", "basilica", "monastery"],
            PoiCategory::Museum => &["museum"],
            PoiCategory::Unknown => &["unknown"],
        }
    }

    /// Collapse a raw label onto its coarse category. Coarse labels map to
    /// themselves; unrecognized labels become `Unknown`.
    pub fn from_subtype(raw: &str) -> PoiCategory {
        let lowered = raw.to_lowercase();
        if let Ok(coarse) = lowered.parse::<PoiCategory>() {
            return coarse;
        }
        for category in PoiCategory::ALL {
            if category.subtypes().contains(&lowered.as_str()) {
                return category;
            }
        }
        PoiCategory::Unknown
    }

    /// Classify an OSM-style tag bag onto a coarse category. Waterfall is
    /// checked before generic water so tagged falls don't collapse into the
    /// lake bucket.
    pub fn from_osm_tags(tags: &HashMap<String, String>) -> PoiCategory {
        let tag = |key: &str| tags.get(key).map(String::as_str).unwrap_or("");

        if tag("natural") == "waterfall" || tag("waterway") == "waterfall" {
            return PoiCategory::Waterfall;
        }
        if matches!(tag("water"), "lake" | "lagoon" | "reservoir" | "pond" | "fjord")
            || tag("natural") == "water"
        {
            return PoiCategory::Lake;
        }
        if tag("tourism") == "viewpoint" || tag("natural") == "peak" {
            return PoiCategory::Viewpoint;
        }
        if tag("natural") == "beach" {
            return PoiCategory::Beach;
        }
        if tag("historic") == "castle" {
            return PoiCategory::Castle;
        }
        if tag("amenity") == "place_of_worship" {
            return PoiCategory::Church;
        }
        if tag("tourism") == "museum" {
            return PoiCategory::Museum;
        }
        if tag("leisure") == "park"
            || tag("leisure") == "nature_reserve"
            || tag("boundary") == "protected_area"
        {
            return PoiCategory::Park;
        }
        PoiCategory::Unknown
    }

    /// Coarse categories whose equivalence set overlaps this category's.
    ///
    /// This is what makes a "lagoon" query search the lake bucket: both sides
    /// of the comparison are subtype sets, and any shared label links the
    /// buckets.
    pub fn matching_buckets(&self) -> Vec<PoiCategory> {
        let own = self.subtypes();
        PoiCategory::ALL
            .into_iter()
            .filter(|other| {
                *other == *self || other.subtypes().iter().any(|s| own.contains(s))
            })
            .collect()
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoiCategory::Lake => "lake",
            PoiCategory::Waterfall => "waterfall",
            PoiCategory::Beach => "beach",
            PoiCategory::Viewpoint => "viewpoint",
            PoiCategory::Park => "park",
            PoiCategory::Castle => "castle",
            PoiCategory::Church => "church",
            PoiCategory::Museum => "museum",
            PoiCategory::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PoiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lake" => Ok(PoiCategory::Lake),
            "waterfall" => Ok(PoiCategory::Waterfall),
            "beach" => Ok(PoiCategory::Beach),
            "viewpoint" => Ok(PoiCategory::Viewpoint),
            "park" => Ok(PoiCategory::Park),
            "castle" => Ok(PoiCategory::Castle),
            "church" => Ok(PoiCategory::Church),
            "museum" => Ok(PoiCategory::Museum),
            "unknown" => Ok(PoiCategory::Unknown),
            _ => Err(format!("Invalid POI category: {}", s)),
        }
    }
}

/// A resolved point of interest flowing through ranking and selection.
///
/// Created by the resolver/discovery collaborators; the engine only attaches
/// `score`, `position_along_route` and `distance_to_destination_km` during
/// selection. Scoped to a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiRecord {
    pub id: Uuid,
    pub name: String,
    pub coordinates: Coordinates,
    pub category: PoiCategory,
    /// Free-form key/value metadata (OSM-style tags). May be empty.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Optional narrative text used for embedding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scenic value in [0, 1], assigned during ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Normalized projection parameter onto the route corridor (0 = start,
    /// 1 = end). Assigned during waypoint selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_along_route: Option<f64>,
    /// Great-circle distance (km) from this POI to the route destination,
    /// used by the progressive filter. Distinct from the perpendicular
    /// distance to the corridor line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_destination_km: Option<f64>,
}

impl PoiRecord {
    pub fn new(name: String, coordinates: Coordinates, category: PoiCategory) -> Self {
        PoiRecord {
            id: Uuid::new_v4(),
            name,
            coordinates,
            category,
            tags: HashMap::new(),
            description: None,
            score: None,
            position_along_route: None,
            distance_to_destination_km: None,
        }
    }

    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Identity key used for dedup across buckets: name plus coordinates
    /// rounded to six decimals plus category.
    pub fn dedup_key(&self, decimals: u32) -> (String, i64, i64, PoiCategory) {
        let multiplier = 10_f64.powi(decimals as i32);
        (
            self.name.clone(),
            (self.coordinates.lat * multiplier).round() as i64,
            (self.coordinates.lon * multiplier).round() as i64,
            self.category,
        )
    }

    /// Location key used for self-match suppression: coordinates rounded to
    /// six decimals plus category, name deliberately excluded.
    pub fn location_key(&self, decimals: u32) -> (i64, i64, PoiCategory) {
        let multiplier = 10_f64.powi(decimals as i32);
        (
            (self.coordinates.lat * multiplier).round() as i64,
            (self.coordinates.lon * multiplier).round() as i64,
            self.category,
        )
    }
}

/// A ranked alternative destination.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityHit {
    pub poi: PoiRecord,
    /// Raw cosine similarity, clamped to [0, 1] before fusion.
    pub cosine: f64,
    /// Fused score: `alpha * cosine + (1 - alpha) * scenic_boost`.
    pub final_score: f64,
}
