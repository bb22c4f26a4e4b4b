//! Visual Crossing timeline API client
//!
//! The only provider that honors a requested `date`. The value is not
//! validated; it is percent-encoded into the path as given.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{info, instrument};

use super::WeatherSource;
use super::conditions::normalize;
use super::http::ProviderHttp;
use crate::config::ProviderConfig;
use crate::models::{HourlyForecastEntry, Location, SimplifiedWeatherType, WeatherProvider};
use crate::{Result, StoreWeatherError};

const PROVIDER: &str = "Visual Crossing";
const TIMELINE_PATH: &str = "/VisualCrossingWebServices/rest/services/timeline";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineResponse {
    current_conditions: Option<Conditions>,
    #[serde(default)]
    days: Vec<Day>,
}

#[derive(Debug, Deserialize)]
struct Conditions {
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Day {
    icon: Option<String>,
    #[serde(default)]
    hours: Vec<Hour>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Hour {
    datetime_epoch: i64,
    icon: Option<String>,
    temp: f64,
    precipprob: Option<f64>,
}

pub struct VisualCrossingClient {
    http: ProviderHttp,
}

impl VisualCrossingClient {
    pub fn new(settings: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: ProviderHttp::new(WeatherProvider::VisualCrossing, settings)?,
        })
    }

    fn timeline_path(location: &Location, date: Option<&str>) -> String {
        let mut path = format!(
            "{TIMELINE_PATH}/{},{}",
            location.latitude, location.longitude
        );
        if let Some(date) = date {
            path.push('/');
            path.push_str(&urlencoding::encode(date));
        }
        path
    }

    fn params(&self, include: &str) -> [(&'static str, String); 3] {
        [
            ("key", self.http.api_key().to_string()),
            ("unitGroup", "metric".to_string()),
            ("include", include.to_string()),
        ]
    }
}

#[async_trait]
impl WeatherSource for VisualCrossingClient {
    fn provider(&self) -> WeatherProvider {
        WeatherProvider::VisualCrossing
    }

    #[instrument(skip(self, location), fields(group_id = %location.group_id))]
    async fn current_weather(
        &self,
        location: &Location,
        date: Option<&str>,
    ) -> Result<SimplifiedWeatherType> {
        let url = self
            .http
            .url(&Self::timeline_path(location, date), &self.params("current,days"))?;
        let body: TimelineResponse = self.http.get_json(url).await?;

        let icon = body
            .current_conditions
            .and_then(|c| c.icon)
            .or_else(|| body.days.into_iter().next().and_then(|d| d.icon))
            .ok_or_else(|| StoreWeatherError::parse(PROVIDER, "No weather conditions"))?;

        let weather_type = normalize(WeatherProvider::VisualCrossing, icon.as_str());
        info!("Visual Crossing icon {} mapped to {}", icon, weather_type);
        Ok(weather_type)
    }

    #[instrument(skip(self, location), fields(group_id = %location.group_id))]
    async fn hourly_forecast(
        &self,
        location: &Location,
        date: Option<&str>,
    ) -> Result<Vec<HourlyForecastEntry>> {
        let path = Self::timeline_path(location, Some(date.unwrap_or("today")));
        let url = self.http.url(&path, &self.params("hours"))?;
        let body: TimelineResponse = self.http.get_json(url).await?;

        let day = body
            .days
            .into_iter()
            .next()
            .ok_or_else(|| StoreWeatherError::parse(PROVIDER, "No forecast day"))?;

        day.hours
            .into_iter()
            .map(|hour| {
                let timestamp = DateTime::from_timestamp(hour.datetime_epoch, 0).ok_or_else(|| {
                    StoreWeatherError::parse(
                        PROVIDER,
                        format!("Invalid datetimeEpoch {}", hour.datetime_epoch),
                    )
                })?;
                Ok(HourlyForecastEntry {
                    timestamp,
                    weather_type: normalize(
                        WeatherProvider::VisualCrossing,
                        hour.icon.as_deref().unwrap_or(""),
                    ),
                    temperature_celsius: hour.temp,
                    chance_of_rain_percent: hour.precipprob.unwrap_or(0.0),
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

    fn client(base_url: &str) -> VisualCrossingClient {
        VisualCrossingClient::new(&ProviderConfig {
            api_key: Some("vc-key".to_string()),
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

    #[test]
    fn test_timeline_path_encodes_date() {
        let location = store_location();
        assert_eq!(
            VisualCrossingClient::timeline_path(&location, None),
            "/VisualCrossingWebServices/rest/services/timeline/10,106"
        );
        assert_eq!(
            VisualCrossingClient::timeline_path(&location, Some("2025 06/01")),
            "/VisualCrossingWebServices/rest/services/timeline/10,106/2025%2006%2F01"
        );
    }

    #[tokio::test]
    async fn test_current_prefers_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/VisualCrossingWebServices/rest/services/timeline/10,106"))
            .and(query_param("key", "vc-key"))
            .and(query_param("include", "current,days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currentConditions": {"icon": "partly-cloudy-night"},
                "days": [{"icon": "rain"}]
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
    async fn test_current_for_date_falls_back_to_day_icon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/VisualCrossingWebServices/rest/services/timeline/10,106/2025-06-01",
            ))
            .and(query_param("include", "current,days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "days": [{"icon": "showers-day"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let weather = client(&server.uri())
            .current_weather(&store_location(), Some("2025-06-01"))
            .await
            .unwrap();
        assert_eq!(weather, SimplifiedWeatherType::LightRain);
    }

    #[tokio::test]
    async fn test_hourly_defaults_to_today() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/VisualCrossingWebServices/rest/services/timeline/10,106/today",
            ))
            .and(query_param("include", "hours"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "days": [{"icon": "rain", "hours": [
                    {"datetimeEpoch": 1_717_200_000, "icon": "clear-day", "temp": 24.0, "precipprob": 0.0},
                    {"datetimeEpoch": 1_717_203_600, "icon": "thunder-rain", "temp": 23.0, "precipprob": 80.0},
                    {"datetimeEpoch": 1_717_207_200, "icon": "fog", "temp": 22.5}
                ]}]
            })))
            .mount(&server)
            .await;

        let entries = client(&server.uri())
            .hourly_forecast(&store_location(), None)
            .await
            .unwrap();
        let types: Vec<_> = entries.iter().map(|e| e.weather_type).collect();
        assert_eq!(
            types,
            vec![
                SimplifiedWeatherType::Sunny,
                SimplifiedWeatherType::HeavyRain,
                SimplifiedWeatherType::Cloudy
            ]
        );
        assert_eq!(entries[1].chance_of_rain_percent, 80.0);
        assert_eq!(entries[2].chance_of_rain_percent, 0.0);
    }

    #[tokio::test]
    async fn test_no_days_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"days": []})))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .hourly_forecast(&store_location(), Some("2025-06-01"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::UpstreamParseError);
    }
}
