use crate::constants::{HTTP_TIMEOUT_SECONDS, HTTP_USER_AGENT};
use crate::error::{AppError, Result};
use crate::models::{Coordinates, PoiCategory, PoiRecord};
use crate::services::PoiDiscovery;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Primary Overpass API endpoints with automatic fallback.
const OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

/// OSM tag selectors for the scenic feature classes we discover.
const SCENIC_SELECTORS: &[&str] = &[
    "natural=water",
    "natural=waterfall",
    "natural=beach",
    "natural=peak",
    "tourism=viewpoint",
    "leisure=park",
    "leisure=nature_reserve",
    "historic=castle",
    "amenity=place_of_worship",
    "tourism=museum",
];

/// Discovers POIs from OpenStreetMap via the Overpass API.
///
/// Discovery is best-effort by contract: any failure, on every endpoint,
/// yields an empty pool rather than an error, and duplicates are left for
/// the selector to remove.
#[derive(Clone)]
pub struct OverpassDiscovery {
    client: Client,
    endpoints: Vec<String>,
    current_endpoint_idx: Arc<AtomicUsize>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassDiscovery {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();

        OverpassDiscovery {
            client,
            endpoints: OVERPASS_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            current_endpoint_idx: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Round-robin over the endpoint list so a struggling mirror doesn't
    /// absorb every request.
    fn next_endpoint(&self) -> String {
        let idx = self.current_endpoint_idx.fetch_add(1, Ordering::Relaxed);
        self.endpoints[idx % self.endpoints.len()].clone()
    }

    /// Overpass expects the query as a form-encoded `data` parameter in the
    /// POST body, not as a URL query string.
    fn form_body(query: &str) -> String {
        format!("data={}", urlencoding::encode(query))
    }

    fn build_query(center: &Coordinates, radius_meters: f64, limit: usize) -> String {
        let clauses: String = SCENIC_SELECTORS
            .iter()
            .flat_map(|selector| {
                let (key, value) = selector.split_once('=').unwrap_or((selector, ""));
                [
                    format!(
                        "node[\"{key}\"=\"{value}\"][\"name\"](around:{radius_meters:.0},{},{});",
                        center.lat, center.lon
                    ),
                    format!(
                        "way[\"{key}\"=\"{value}\"][\"name\"](around:{radius_meters:.0},{},{});",
                        center.lat, center.lon
                    ),
                ]
            })
            .collect();

        format!("[out:json][timeout:25];({clauses});out center {limit};")
    }

    async fn execute_query(&self, query: &str) -> Result<Vec<PoiRecord>> {
        let endpoint = self.next_endpoint();
        tracing::debug!("Overpass query via {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Self::form_body(query))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Overpass request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Overpass HTTP {} from {}",
                response.status(),
                endpoint
            )));
        }

        let parsed: OverpassResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Overpass parse failed: {}", e)))?;

        let pois = parsed
            .elements
            .into_iter()
            .filter_map(Self::element_to_poi)
            .collect();
        Ok(pois)
    }

    fn element_to_poi(element: OverpassElement) -> Option<PoiRecord> {
        let (lat, lon) = match (element.lat, element.lon, element.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        let coordinates = Coordinates::new(lat, lon).ok()?;

        let name = element.tags.get("name")?.clone();
        let category = PoiCategory::from_osm_tags(&element.tags);

        let mut record = PoiRecord::new(name, coordinates, category).with_tags(element.tags);
        if let Some(desc) = record
            .tags
            .get("description")
            .or_else(|| record.tags.get("note"))
            .cloned()
        {
            record.description = Some(desc);
        }
        Some(record)
    }
}

impl Default for OverpassDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoiDiscovery for OverpassDiscovery {
    async fn discover(
        &self,
        center: &Coordinates,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<PoiRecord>> {
        let query = Self::build_query(center, radius_km * 1000.0, limit);

        // One attempt per endpoint; first success wins.
        let mut last_error = None;
        for attempt in 0..self.endpoints.len() {
            match self.execute_query(&query).await {
                Ok(pois) => {
                    tracing::info!(
                        found = pois.len(),
                        radius_km = radius_km,
                        "Overpass discovery found {} POIs within {}km",
                        pois.len(),
                        radius_km
                    );
                    return Ok(pois);
                }
                Err(e) => {
                    tracing::warn!("Overpass attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        // Discovery is a best-effort signal: exhausted endpoints are logged
        // and read as an empty area, not a failed request.
        if let Some(e) = last_error {
            tracing::warn!("All Overpass endpoints failed, returning empty pool: {}", e);
        }
        Ok(Vec::new())
    }
}
