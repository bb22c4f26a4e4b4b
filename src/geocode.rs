//! Address geocoding through the Google Geocoding API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::{Result, StoreWeatherError};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address to `(latitude, longitude)`
    async fn geocode(&self, address: &str) -> Result<(f64, f64)>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| {
                StoreWeatherError::config(format!("Failed to create geocoding client: {e}"))
            })?;

        if config.api_key.is_none() {
            warn!("No geocoding API key configured, location creation will fail upstream");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<(f64, f64)> {
        let url = Url::parse_with_params(
            &format!("{}/maps/api/geocode/json", self.base_url),
            &[
                ("address", address),
                ("key", self.api_key.as_deref().unwrap_or_default()),
            ],
        )
        .map_err(|e| StoreWeatherError::config(format!("Invalid geocoding URL: {e}")))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Geocoding request failed: {}", e);
            StoreWeatherError::geocoding(format!("Geocoding request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Geocoding API error");
            return Err(StoreWeatherError::geocoding(format!(
                "Geocoding API returned HTTP {status}"
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            StoreWeatherError::geocoding(format!("Invalid geocoding response: {e}"))
        })?;

        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {
                let Some(first) = body.results.into_iter().next() else {
                    return Err(StoreWeatherError::geocoding(format!(
                        "No geocoding results found for address: {address}"
                    )));
                };
                let LatLng { lat, lng } = first.geometry.location;
                info!("Geocoded address to {:.4}, {:.4}", lat, lng);
                Ok((lat, lng))
            }
            other => {
                let detail = body.error_message.unwrap_or_default();
                error!(status = other, detail = %detail, "Geocoding rejected");
                Err(StoreWeatherError::geocoding(format!(
                    "Geocoding failed with status {other}: {detail}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(base_url: &str) -> GoogleGeocoder {
        GoogleGeocoder::new(&GeocodingConfig {
            api_key: Some("maps-key".to_string()),
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_result_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "1 Le Loi, District 1"))
            .and(query_param("key", "maps-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [
                    {"geometry": {"location": {"lat": 10.776, "lng": 106.700}}},
                    {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coords = geocoder(&server.uri())
            .geocode("1 Le Loi, District 1")
            .await
            .unwrap();
        assert_eq!(coords, (10.776, 106.700));
    }

    #[tokio::test]
    async fn test_zero_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "ZERO_RESULTS", "results": []})),
            )
            .mount(&server)
            .await;

        let err = geocoder(&server.uri()).geocode("nowhere").await.unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::GeocodingFailed);
        assert!(
            err.to_string()
                .contains("No geocoding results found for address: nowhere")
        );
    }

    #[tokio::test]
    async fn test_denied_status_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid."
            })))
            .mount(&server)
            .await;

        let err = geocoder(&server.uri()).geocode("anywhere").await.unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
        assert!(err.to_string().contains("API key is invalid"));
    }
}
