//! Google Weather API client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use super::WeatherSource;
use super::conditions::normalize;
use super::http::ProviderHttp;
use crate::config::ProviderConfig;
use crate::models::{HourlyForecastEntry, Location, SimplifiedWeatherType, WeatherProvider};
use crate::{Result, StoreWeatherError};

const FORECAST_HOURS: u32 = 24;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentConditionsResponse {
    weather_condition: Option<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl WeatherCondition {
    fn simplified(condition: Option<&WeatherCondition>) -> SimplifiedWeatherType {
        let kind = condition
            .and_then(|c| c.kind.as_deref())
            .unwrap_or("TYPE_UNSPECIFIED");
        normalize(WeatherProvider::Google, kind)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyResponse {
    forecast_hours: Option<Vec<ForecastHour>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastHour {
    interval: Interval,
    weather_condition: Option<WeatherCondition>,
    temperature: Temperature,
    precipitation: Option<Precipitation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Interval {
    start_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Temperature {
    degrees: f64,
}

#[derive(Debug, Deserialize)]
struct Precipitation {
    probability: Option<Probability>,
}

#[derive(Debug, Deserialize)]
struct Probability {
    percent: f64,
}

pub struct GoogleWeatherClient {
    http: ProviderHttp,
}

impl GoogleWeatherClient {
    pub fn new(settings: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: ProviderHttp::new(WeatherProvider::Google, settings)?,
        })
    }

    fn location_params(&self, location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.http.api_key().to_string()),
            ("location.latitude", location.latitude.to_string()),
            ("location.longitude", location.longitude.to_string()),
        ]
    }
}

#[async_trait]
impl WeatherSource for GoogleWeatherClient {
    fn provider(&self) -> WeatherProvider {
        WeatherProvider::Google
    }

    #[instrument(skip(self, location, _date), fields(group_id = %location.group_id))]
    async fn current_weather(
        &self,
        location: &Location,
        _date: Option<&str>,
    ) -> Result<SimplifiedWeatherType> {
        let url = self
            .http
            .url("/v1/currentConditions:lookup", &self.location_params(location))?;
        let body: CurrentConditionsResponse = self.http.get_json(url).await?;

        let weather_type = WeatherCondition::simplified(body.weather_condition.as_ref());
        info!(
            "Google condition {:?} mapped to {}",
            body.weather_condition.as_ref().and_then(|c| c.kind.as_deref()),
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
        let mut params = self.location_params(location);
        params.push(("hours", FORECAST_HOURS.to_string()));
        let url = self.http.url("/v1/forecast/hours:lookup", &params)?;
        let body: HourlyResponse = self.http.get_json(url).await?;

        let hours = body
            .forecast_hours
            .ok_or_else(|| StoreWeatherError::parse("Google Weather", "No hourly forecast data"))?;

        Ok(hours
            .into_iter()
            .map(|hour| HourlyForecastEntry {
                timestamp: hour.interval.start_time,
                weather_type: WeatherCondition::simplified(hour.weather_condition.as_ref()),
                temperature_celsius: hour.temperature.degrees,
                chance_of_rain_percent: hour
                    .precipitation
                    .and_then(|p| p.probability)
                    .map_or(0.0, |p| p.percent),
            })
            .collect())
    }
}
