//! WeatherAPI.com client

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

const PROVIDER: &str = "WeatherAPI";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    code: u16,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    #[serde(default)]
    hour: Vec<Hour>,
}

#[derive(Debug, Deserialize)]
struct Hour {
    time_epoch: i64,
    condition: Condition,
    temp_c: f64,
    chance_of_rain: Option<f64>,
}

pub struct WeatherApiClient {
    http: ProviderHttp,
}

impl WeatherApiClient {
    pub fn new(settings: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: ProviderHttp::new(WeatherProvider::WeatherApi, settings)?,
        })
    }
}

fn hourly_entry(hour: Hour) -> Result<HourlyForecastEntry> {
    let timestamp = DateTime::from_timestamp(hour.time_epoch, 0).ok_or_else(|| {
        StoreWeatherError::parse(PROVIDER, format!("Invalid time_epoch {}", hour.time_epoch))
    })?;
    Ok(HourlyForecastEntry {
        timestamp,
        weather_type: normalize(WeatherProvider::WeatherApi, hour.condition.code),
        temperature_celsius: hour.temp_c,
        chance_of_rain_percent: hour.chance_of_rain.unwrap_or(0.0),
    })
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    fn provider(&self) -> WeatherProvider {
        WeatherProvider::WeatherApi
    }

    #[instrument(skip(self, location, _date), fields(group_id = %location.group_id))]
    async fn current_weather(
        &self,
        location: &Location,
        _date: Option<&str>,
    ) -> Result<SimplifiedWeatherType> {
        let url = self.http.url(
            "/v1/current.json",
            &[
                ("key", self.http.api_key().to_string()),
                ("q", location.query_coordinates()),
            ],
        )?;
        let body: CurrentResponse = self.http.get_json(url).await?;

        let weather_type = normalize(WeatherProvider::WeatherApi, body.current.condition.code);
        info!(
            "WeatherAPI code {} mapped to {}",
            body.current.condition.code, weather_type
        );
        Ok(weather_type)
    }

    #[instrument(skip(self, location, _date), fields(group_id = %location.group_id))]
    async fn hourly_forecast(
        &self,
        location: &Location,
        _date: Option<&str>,
    ) -> Result<Vec<HourlyForecastEntry>> {
        let url = self.http.url(
            "/v1/forecast.json",
            &[
                ("key", self.http.api_key().to_string()),
                ("q", location.query_coordinates()),
                ("days", "1".to_string()),
            ],
        )?;
        let body: ForecastResponse = self.http.get_json(url).await?;

        let day = body
            .forecast
            .forecastday
            .into_iter()
            .next()
            .ok_or_else(|| StoreWeatherError::parse(PROVIDER, "No forecast data"))?;

        day.hour.into_iter().map(hourly_entry).collect()
    }
}
