//! Shared outbound HTTP plumbing for weather providers
//!
//! One pooled client per provider, wrapped in retry middleware, with a
//! per-provider timeout and a cap on in-flight requests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::config::ProviderConfig;
use crate::models::WeatherProvider;
use crate::{Result, StoreWeatherError};

const USER_AGENT: &str = concat!("StoreWeather/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ProviderHttp {
    provider: WeatherProvider,
    client: ClientWithMiddleware,
    limiter: Arc<Semaphore>,
    base_url: String,
    api_key: Option<String>,
}

impl ProviderHttp {
    pub fn new(provider: WeatherProvider, settings: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                StoreWeatherError::config(format!("Failed to create {provider} HTTP client: {e}"))
            })?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            provider,
            client,
            limiter: Arc::new(Semaphore::new(settings.max_concurrent_requests.max(1) as usize)),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    #[must_use]
    pub fn provider(&self) -> WeatherProvider {
        self.provider
    }

    /// Configured key, empty when none was set
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Base URL joined with `path` and the encoded query pairs
    pub fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params).map_err(|e| {
            StoreWeatherError::config(format!("Invalid {} URL: {e}", self.provider))
        })
    }

    /// Single GET decoded as JSON.
    ///
    /// Non-2xx answers become `Upstream` with the status and body, bodies
    /// that do not decode into `T` become `Parse`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let provider = self.provider.display_name();
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| StoreWeatherError::general(format!("{provider} limiter closed: {e}")))?;

        debug!("GET {}{}", url.origin().ascii_serialization(), url.path());
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("{} request failed: {}", provider, e);
            StoreWeatherError::transport(provider, e.to_string())
        })?;

        let status = response.status();
        debug!(
            "{} responded {} in {:.3}s",
            provider,
            status,
            start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "{} API error", provider);
            return Err(StoreWeatherError::Upstream {
                provider: provider.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to decode {} response: {}", provider, e);
            StoreWeatherError::parse(provider, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            max_concurrent_requests: 2,
            max_retries: 0,
        }
    }

    #[test]
    fn test_url_encodes_params_and_trims_slash() {
        let http =
            ProviderHttp::new(WeatherProvider::WeatherApi, &settings("http://localhost:1/")).unwrap();
        let url = http
            .url("/v1/current.json", &[("key", "a b".to_string()), ("q", "10,106".to_string())])
            .unwrap();
        assert_eq!(url.path(), "/v1/current.json");
        assert_eq!(url.query(), Some("key=a+b&q=10%2C106"));
    }

    #[test]
    fn test_missing_key_is_empty() {
        let mut s = settings("http://localhost:1");
        s.api_key = None;
        let http = ProviderHttp::new(WeatherProvider::Google, &s).unwrap();
        assert_eq!(http.api_key(), "");
    }

    #[tokio::test]
    async fn test_success_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let http = ProviderHttp::new(WeatherProvider::WeatherApi, &settings(&server.uri())).unwrap();
        let url = http.url("/ping", &[("key", http.api_key().to_string())]).unwrap();
        let body: Value = http.get_json(url).await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let http = ProviderHttp::new(WeatherProvider::OpenWeather, &settings(&server.uri())).unwrap();
        let url = http.url("/data/2.5/weather", &[]).unwrap();
        let err = http.get_json::<Value>(url).await.unwrap_err();
        match err {
            StoreWeatherError::Upstream { status, body, .. } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key invalid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let http = ProviderHttp::new(WeatherProvider::Google, &settings(&server.uri())).unwrap();
        let url = http.url("/v1/currentConditions:lookup", &[]).unwrap();
        let err = http.get_json::<Value>(url).await.unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::UpstreamParseError);
    }
}
