use crate::constants::{HTTP_TIMEOUT_SECONDS, HTTP_USER_AGENT};
use crate::error::{AppError, Result};
use crate::models::{Coordinates, RoutingProfile};
use crate::services::RoutingEngine;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenRouteService directions client.
///
/// One request per profile; the orchestrator walks the profile priority list
/// and treats any per-profile failure as "try the next one".
#[derive(Clone)]
pub struct OrsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    /// ORS expects lon/lat order.
    coordinates: Vec<[f64; 2]>,
    instructions: bool,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    geometry: DirectionsGeometry,
}

#[derive(Debug, Deserialize)]
struct DirectionsGeometry {
    /// lon/lat pairs.
    coordinates: Vec<Vec<f64>>,
}

impl OrsClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();

        OrsClient {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl RoutingEngine for OrsClient {
    async fn route(
        &self,
        points: &[Coordinates],
        profile: RoutingProfile,
    ) -> Result<Vec<Coordinates>> {
        if points.len() < 2 {
            return Err(AppError::InvalidRequest(
                "At least 2 route points required".to_string(),
            ));
        }

        let url = format!(
            "{}/v2/directions/{}/geojson",
            self.base_url,
            profile.ors_profile()
        );
        let body = DirectionsRequest {
            coordinates: points.iter().map(|c| [c.lon, c.lat]).collect(),
            instructions: false,
        };

        tracing::debug!(
            points = points.len(),
            profile = profile.ors_profile(),
            "ORS directions request: {} points, profile {}",
            points.len(),
            profile.ors_profile()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Routing(format!("ORS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                profile = profile.ors_profile(),
                "ORS HTTP error {}: {}",
                status,
                error_text
            );
            return Err(AppError::Routing(format!("HTTP {}: {}", status, error_text)));
        }

        let directions: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Routing(format!("ORS parse failed: {}", e)))?;

        let Some(feature) = directions.features.into_iter().next() else {
            return Err(AppError::Routing(format!(
                "ORS returned no routes for profile {}",
                profile.ors_profile()
            )));
        };

        let polyline: Vec<Coordinates> = feature
            .geometry
            .coordinates
            .into_iter()
            .filter(|pair| pair.len() >= 2)
            .filter_map(|pair| Coordinates::new(pair[1], pair[0]).ok())
            .collect();

        if polyline.is_empty() {
            return Err(AppError::Routing(
                "ORS returned an empty polyline".to_string(),
            ));
        }

        tracing::debug!(
            points = polyline.len(),
            profile = profile.ors_profile(),
            "ORS returned {} polyline points",
            polyline.len()
        );
        Ok(polyline)
    }
}
