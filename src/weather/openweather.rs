//! OpenWeather client

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{info, instrument};

use super::WeatherSource;
use super::conditions::{RawCondition, normalize};
use super::http::ProviderHttp;
use crate::config::ProviderConfig;
use crate::models::{HourlyForecastEntry, Location, SimplifiedWeatherType, WeatherProvider};
use crate::{Result, StoreWeatherError};

const PROVIDER: &str = "OpenWeather";
// 8 three-hour steps
const FORECAST_STEPS: u32 = 8;

#[derive(Debug, Deserialize)]
struct Condition {
    id: Option<u16>,
    main: Option<String>,
}

fn simplified(conditions: &[Condition]) -> SimplifiedWeatherType {
    let (id, category) = conditions
        .first()
        .map_or((None, None), |c| (c.id, c.main.as_deref()));
    normalize(
        WeatherProvider::OpenWeather,
        RawCondition::Classified {
            id: id.map(i64::from),
            category,
        },
    )
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastStep>,
}

#[derive(Debug, Deserialize)]
struct ForecastStep {
    dt: i64,
    main: Main,
    #[serde(default)]
    weather: Vec<Condition>,
    /// Probability of precipitation, 0..1
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
}

pub struct OpenWeatherClient {
    http: ProviderHttp,
}

impl OpenWeatherClient {
    pub fn new(settings: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: ProviderHttp::new(WeatherProvider::OpenWeather, settings)?,
        })
    }

    fn params(&self, location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("appid", self.http.api_key().to_string()),
            ("units", "metric".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    fn provider(&self) -> WeatherProvider {
        WeatherProvider::OpenWeather
    }

    #[instrument(skip(self, location, _date), fields(group_id = %location.group_id))]
    async fn current_weather(
        &self,
        location: &Location,
        _date: Option<&str>,
    ) -> Result<SimplifiedWeatherType> {
        let url = self.http.url("/data/2.5/weather", &self.params(location))?;
        let body: CurrentResponse = self.http.get_json(url).await?;

        let weather_type = simplified(&body.weather);
        info!(
            "OpenWeather condition {:?} mapped to {}",
            body.weather.first().map(|c| (c.id, c.main.as_deref())),
            weather_type
        );
        Ok(weather_type)
    }

    #[instrument(skip(self, location, _date), fields(group_id = %location.group_id))]
    async fn hourly_forecast(
        &self,
        location: &Location,
        _date: Option<&str>,
    ) -> Result<Vec<HourlyForecastEntry>> {
        let mut params = self.params(location);
        params.push(("cnt", FORECAST_STEPS.to_string()));
        let url = self.http.url("/data/2.5/forecast", &params)?;
        let body: ForecastResponse = self.http.get_json(url).await?;

        body.list
            .into_iter()
            .map(|step| {
                let timestamp = DateTime::from_timestamp(step.dt, 0).ok_or_else(|| {
                    StoreWeatherError::parse(PROVIDER, format!("Invalid dt {}", step.dt))
                })?;
                Ok(HourlyForecastEntry {
                    timestamp,
                    weather_type: simplified(&step.weather),
                    temperature_celsius: step.main.temp,
                    chance_of_rain_percent: step.pop.unwrap_or(0.0) * 100.0,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> OpenWeatherClient {
        OpenWeatherClient::new(&ProviderConfig {
            api_key: Some("ow-key".to_string()),
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            max_concurrent_requests: 4,
            max_retries: 0,
        })
        .unwrap()
    }

    fn store_location() -> Location {
        Location::new("G1".to_string(), "1 Main St".to_string(), 10.0, 106.0)
    }

    #[tokio::test]
    async fn test_specific_id_beats_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("appid", "ow-key"))
            .and(query_param("units", "metric"))
            .and(query_param("lat", "10"))
            .and(query_param("lon", "106"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"id": 801, "main": "Clouds", "description": "few clouds"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let weather = client(&server.uri())
            .current_weather(&store_location(), None)
            .await
            .unwrap();
        assert_eq!(weather, SimplifiedWeatherType::PartlyCloudy);
    }

    #[tokio::test]
    async fn test_hourly_scales_pop_to_percent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("cnt", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [
                    {"dt": 1_717_200_000, "main": {"temp": 29.4}, "weather": [{"id": 800, "main": "Clear"}], "pop": 0.25},
                    {"dt": 1_717_210_800, "main": {"temp": 27.1}, "weather": [{"id": 502, "main": "Rain"}]}
                ]
            })))
            .mount(&server)
            .await;

        let entries = client(&server.uri())
            .hourly_forecast(&store_location(), None)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].weather_type, SimplifiedWeatherType::Sunny);
        assert_eq!(entries[0].chance_of_rain_percent, 25.0);
        assert_eq!(entries[1].weather_type, SimplifiedWeatherType::HeavyRain);
        assert_eq!(entries[1].chance_of_rain_percent, 0.0);
    }

    #[tokio::test]
    async fn test_unauthorized_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "cod": 401, "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .current_weather(&store_location(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::UpstreamHttpError);
        assert_eq!(err.to_string(), "OpenWeather API error: 401");
    }
}
