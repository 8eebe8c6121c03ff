//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change. For
//! tuning knobs that benefit from runtime experimentation, see
//! [`RankerConfig`](crate::config::RankerConfig) and
//! [`SelectorConfig`](crate::config::SelectorConfig) instead.

// --- Geometry ---

/// Mean Earth radius (km) used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Kilometers per degree of latitude (and longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;
/// Segments shorter than this (squared km) are treated as a single point when
/// projecting onto them.
pub const DEGENERATE_SEGMENT_EPSILON: f64 = 1e-10;

// --- Similarity ranking defaults ---

/// Default blend weight between cosine similarity and scenic boost.
/// `final = alpha * cosine + (1 - alpha) * scenic`.
pub const DEFAULT_ALPHA: f64 = 0.7;
/// Default maximum distance (km) from the user center for candidates.
pub const DEFAULT_RADIUS_KM: f64 = 200.0;
/// Default number of alternatives returned per query.
pub const DEFAULT_TOP_K: usize = 5;
/// Coordinates are rounded to this many decimal places (~0.1 m) when building
/// dedup and self-suppression keys.
pub const DEDUP_COORD_DECIMALS: u32 = 6;

// --- Scenic boost coefficients ---
// The total boost is clamped to [0, SCENIC_BOOST_MAX].

/// Hard upper bound on the scenic boost.
pub const SCENIC_BOOST_MAX: f64 = 0.3;
/// Category weight for strongly scenic categories (lake, waterfall, beach,
/// viewpoint).
pub const SCENIC_CATEGORY_WEIGHT_NATURAL: f64 = 0.12;
/// Category weight for parks.
pub const SCENIC_CATEGORY_WEIGHT_PARK: f64 = 0.08;
/// Bonus for scenic `natural=*` tag values.
pub const SCENIC_NATURAL_TAG_BONUS: f64 = 0.03;
/// Bonus for scenic `leisure=*` tag values.
pub const SCENIC_LEISURE_TAG_BONUS: f64 = 0.03;
/// Bonus when the POI sits inside a tagged protected area.
pub const SCENIC_PROTECTED_AREA_BONUS: f64 = 0.07;
/// Weaker bonus when only a national-park leisure tag is present.
pub const SCENIC_NATIONAL_PARK_BONUS: f64 = 0.05;
/// Bonus when the relief heuristic reports steep surrounding terrain.
pub const SCENIC_STEEP_RELIEF_BONUS: f64 = 0.1;

// --- Waypoint selection defaults ---

/// Default tolerated backward movement (km) in the progressive filter.
pub const DEFAULT_PROGRESSIVE_TOLERANCE_KM: f64 = 2.0;
/// Default grid size (meters) for deduplicating discovered POIs.
pub const DEFAULT_DEDUP_THRESHOLD_M: f64 = 100.0;
/// Discovery fans out this many times `max_pois` candidates before filtering.
pub const DISCOVERY_POOL_MULTIPLIER: usize = 30;
/// Corridor discovery radius bounds (km): half the route distance, clamped.
pub const DISCOVERY_RADIUS_MIN_KM: f64 = 10.0;
pub const DISCOVERY_RADIUS_MAX_KM: f64 = 100.0;

// --- Cache TTL defaults (seconds, used when env vars are absent) ---

/// Default embedding cache TTL: 30 days. Overridden by `EMBEDDING_CACHE_TTL`.
pub const DEFAULT_EMBEDDING_CACHE_TTL_SECONDS: u64 = 2_592_000;
/// Default in-memory embedding cache capacity (entries).
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 100_000;

// --- External service defaults (used when env vars are absent) ---

/// Default Nominatim search endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
/// Default OpenRouteService base URL.
pub const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org";
/// User agent sent to OSM-ecosystem services, which require one.
pub const HTTP_USER_AGENT: &str = "sidetrip/0.1 (alternative destination engine)";
/// Timeout (seconds) for collaborator HTTP calls.
pub const HTTP_TIMEOUT_SECONDS: u64 = 20;
