use crate::constants::{HTTP_TIMEOUT_SECONDS, HTTP_USER_AGENT};
use crate::models::Coordinates;
use crate::services::ReliefHeuristic;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Payloads smaller than this are flat-sea tiles or error documents, not a
/// rendered elevation tile.
const MIN_TILE_BYTES: usize = 1000;

/// Steep-relief probe against an elevation WMS layer.
///
/// Fetches a small GetMap tile around the point; a non-trivial payload is
/// read as "there is rendered elevation here", a cheap stand-in for real
/// slope analysis. Strictly best-effort: configured without a URL, or on any
/// failure, the answer is `false`.
#[derive(Clone)]
pub struct WmsReliefClient {
    client: Client,
    wms_url: Option<String>,
}

impl WmsReliefClient {
    pub fn new(wms_url: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();

        WmsReliefClient { client, wms_url }
    }
}

#[async_trait]
impl ReliefHeuristic for WmsReliefClient {
    async fn is_steep_relief(&self, coordinates: &Coordinates) -> bool {
        let Some(ref url) = self.wms_url else {
            return false;
        };

        let bbox = format!(
            "{},{},{},{}",
            coordinates.lat - 0.02,
            coordinates.lon - 0.02,
            coordinates.lat + 0.02,
            coordinates.lon + 0.02
        );

        let result = self
            .client
            .get(url)
            .query(&[
                ("SERVICE", "WMS"),
                ("REQUEST", "GetMap"),
                ("VERSION", "1.3.0"),
                ("LAYERS", "EUDEM"),
                ("CRS", "EPSG:4326"),
                ("BBOX", bbox.as_str()),
                ("WIDTH", "128"),
                ("HEIGHT", "128"),
                ("FORMAT", "image/png"),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) => bytes.len() > MIN_TILE_BYTES,
                Err(e) => {
                    tracing::debug!("Relief tile read failed: {}", e);
                    false
                }
            },
            Ok(response) => {
                tracing::debug!("Relief WMS HTTP {}", response.status());
                false
            }
            Err(e) => {
                tracing::debug!("Relief WMS request failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_reads_flat() {
        let client = WmsReliefClient::new(None);
        let point = Coordinates::new(47.5551, 12.9766).unwrap();
        assert!(!client.is_steep_relief(&point).await);
    }
}
