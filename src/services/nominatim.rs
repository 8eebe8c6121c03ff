use crate::constants::{HTTP_TIMEOUT_SECONDS, HTTP_USER_AGENT};
use crate::error::{AppError, Result};
use crate::models::{Coordinates, PoiCategory, PoiRecord};
use crate::services::PoiResolver;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Resolves free-text place names through the Nominatim search API.
#[derive(Clone)]
pub struct NominatimResolver {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    extratags: Option<HashMap<String, String>>,
    #[serde(default)]
    namedetails: Option<HashMap<String, String>>,
}

impl NominatimResolver {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();

        NominatimResolver { client, base_url }
    }

    /// Map OSM-style tags (plus an optional caller hint) onto a coarse
    /// category. The hint wins when the tags corroborate it; otherwise the
    /// tags decide, and anything unclassifiable is `Unknown`.
    fn infer_category(tags: &HashMap<String, String>, hint: Option<&str>) -> PoiCategory {
        if let Some(hint) = hint {
            let hinted = PoiCategory::from_subtype(hint);
            if hinted != PoiCategory::Unknown && Self::tags_corroborate(tags, hinted) {
                return hinted;
            }
        }
        PoiCategory::from_osm_tags(tags)
    }

    /// Whether the tag bag is consistent with the hinted category.
    fn tags_corroborate(tags: &HashMap<String, String>, category: PoiCategory) -> bool {
        let tag = |key: &str| tags.get(key).map(String::as_str).unwrap_or("");
        match category {
            PoiCategory::Waterfall => {
                tag("natural") == "waterfall" || tag("waterway") == "waterfall"
            }
            PoiCategory::Lake => tag("natural") == "water" || !tag("water").is_empty(),
            PoiCategory::Viewpoint => tag("tourism") == "viewpoint" || tag("natural") == "peak",
            PoiCategory::Beach => tag("natural") == "beach",
            PoiCategory::Castle => tag("historic") == "castle",
            PoiCategory::Church => tag("amenity") == "place_of_worship",
            PoiCategory::Museum => tag("tourism") == "museum",
            PoiCategory::Park => {
                tag("leisure") == "park"
                    || tag("boundary") == "protected_area"
                    || tag("leisure") == "nature_reserve"
            }
            PoiCategory::Unknown => false,
        }
    }
}

#[async_trait]
impl PoiResolver for NominatimResolver {
    async fn resolve(&self, name: &str, hint: Option<&str>) -> Result<Option<PoiRecord>> {
        tracing::debug!("Nominatim lookup: '{}' (hint: {:?})", name, hint);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", name),
                ("format", "jsonv2"),
                ("limit", "1"),
                ("extratags", "1"),
                ("namedetails", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Nominatim HTTP {}",
                status
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Nominatim parse failed: {}", e)))?;

        let Some(hit) = results.into_iter().next() else {
            tracing::debug!("Nominatim: no match for '{}'", name);
            return Ok(None);
        };

        let lat: f64 = hit
            .lat
            .parse()
            .map_err(|_| AppError::ExternalApi(format!("Bad latitude from Nominatim: {}", hit.lat)))?;
        let lon: f64 = hit
            .lon
            .parse()
            .map_err(|_| AppError::ExternalApi(format!("Bad longitude from Nominatim: {}", hit.lon)))?;
        let coordinates =
            Coordinates::new(lat, lon).map_err(AppError::ExternalApi)?;

        let tags = hit.extratags.unwrap_or_default();
        let category = Self::infer_category(&tags, hint);

        let display_name = hit
            .namedetails
            .as_ref()
            .and_then(|details| details.get("name").cloned())
            .unwrap_or_else(|| {
                hit.display_name
                    .split(',')
                    .next()
                    .unwrap_or(&hit.display_name)
                    .to_string()
            });

        let mut record = PoiRecord::new(display_name, coordinates, category).with_tags(tags);
        if let Some(desc) = record
            .tags
            .get("description")
            .or_else(|| record.tags.get("note"))
            .cloned()
        {
            record.description = Some(desc);
        }

        Ok(Some(record))
    }
}
