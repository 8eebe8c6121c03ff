use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub nominatim_url: String,
    pub ors_base_url: String,
    pub ors_api_key: Option<String>,
    pub relief_wms_url: Option<String>,
    pub redis_url: Option<String>,
    pub embedding_cache_ttl: u64,
    pub ranker: RankerConfig,
    pub selector: SelectorConfig,
}

/// Tuning knobs for the similarity ranker.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Blend weight: `final = alpha * cosine + (1 - alpha) * scenic`.
    /// Must lie in [0, 1].
    pub alpha: f64,

    /// Candidates farther than this (km) from the user center are dropped
    /// before bucket build and again after search.
    pub radius_km: f64,

    /// Number of alternatives returned per query.
    pub top_k: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        RankerConfig {
            alpha: DEFAULT_ALPHA,
            radius_km: DEFAULT_RADIUS_KM,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Tuning knobs for route waypoint selection.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Tolerated backward movement (km) in the progressive filter.
    pub tolerance_km: f64,

    /// Grid size (meters) for deduplicating discovered POIs.
    pub dedup_threshold_m: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            tolerance_km: DEFAULT_PROGRESSIVE_TOLERANCE_KM,
            dedup_threshold_m: DEFAULT_DEDUP_THRESHOLD_M,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let ranker = RankerConfig {
            alpha: parse_env("SIMILARITY_ALPHA", DEFAULT_ALPHA)?,
            radius_km: parse_env("SIMILARITY_RADIUS_KM", DEFAULT_RADIUS_KM)?,
            top_k: parse_env("SIMILARITY_TOP_K", DEFAULT_TOP_K)?,
        };
        if !(0.0..=1.0).contains(&ranker.alpha) {
            return Err(format!(
                "SIMILARITY_ALPHA must be between 0 and 1, got {}",
                ranker.alpha
            ));
        }
        if ranker.radius_km <= 0.0 {
            return Err(format!(
                "SIMILARITY_RADIUS_KM must be positive, got {}",
                ranker.radius_km
            ));
        }
        if ranker.top_k == 0 {
            return Err("SIMILARITY_TOP_K must be at least 1".to_string());
        }

        let selector = SelectorConfig {
            tolerance_km: parse_env("PROGRESSIVE_TOLERANCE_KM", DEFAULT_PROGRESSIVE_TOLERANCE_KM)?,
            dedup_threshold_m: parse_env("DEDUP_THRESHOLD_M", DEFAULT_DEDUP_THRESHOLD_M)?,
        };
        if selector.tolerance_km < 0.0 {
            return Err(format!(
                "PROGRESSIVE_TOLERANCE_KM must not be negative, got {}",
                selector.tolerance_km
            ));
        }

        Ok(Config {
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string()),
            ors_base_url: env::var("ORS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ORS_BASE_URL.to_string()),
            ors_api_key: env::var("ORS_API_KEY").ok(),
            relief_wms_url: env::var("RELIEF_WMS_URL").ok(),
            redis_url: env::var("REDIS_URL").ok(),
            embedding_cache_ttl: parse_env(
                "EMBEDDING_CACHE_TTL",
                DEFAULT_EMBEDDING_CACHE_TTL_SECONDS,
            )?,
            ranker,
            selector,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| format!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}
