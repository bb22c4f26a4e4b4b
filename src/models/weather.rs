//! Simplified weather types shared by every provider

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StoreWeatherError;

/// The five-value taxonomy every provider vocabulary is folded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimplifiedWeatherType {
    #[serde(rename = "sunny")]
    Sunny,
    #[serde(rename = "partly cloudy")]
    PartlyCloudy,
    #[serde(rename = "cloudy")]
    Cloudy,
    #[serde(rename = "light rain")]
    LightRain,
    #[serde(rename = "heavy rain")]
    HeavyRain,
}

impl SimplifiedWeatherType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SimplifiedWeatherType::Sunny => "sunny",
            SimplifiedWeatherType::PartlyCloudy => "partly cloudy",
            SimplifiedWeatherType::Cloudy => "cloudy",
            SimplifiedWeatherType::LightRain => "light rain",
            SimplifiedWeatherType::HeavyRain => "heavy rain",
        }
    }
}

impl fmt::Display for SimplifiedWeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Third-party weather sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherProvider {
    Google,
    WeatherApi,
    OpenWeather,
    VisualCrossing,
}

impl WeatherProvider {
    pub const ALL: [WeatherProvider; 4] = [
        WeatherProvider::Google,
        WeatherProvider::WeatherApi,
        WeatherProvider::OpenWeather,
        WeatherProvider::VisualCrossing,
    ];

    /// Path segment and config key
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            WeatherProvider::Google => "google",
            WeatherProvider::WeatherApi => "weatherapi",
            WeatherProvider::OpenWeather => "openweather",
            WeatherProvider::VisualCrossing => "visualcrossing",
        }
    }

    /// Name used in logs and error messages
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            WeatherProvider::Google => "Google Weather",
            WeatherProvider::WeatherApi => "WeatherAPI",
            WeatherProvider::OpenWeather => "OpenWeather",
            WeatherProvider::VisualCrossing => "Visual Crossing",
        }
    }
}

impl fmt::Display for WeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for WeatherProvider {
    type Err = StoreWeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(WeatherProvider::Google),
            "weatherapi" => Ok(WeatherProvider::WeatherApi),
            "openweather" => Ok(WeatherProvider::OpenWeather),
            "visualcrossing" => Ok(WeatherProvider::VisualCrossing),
            other => Err(StoreWeatherError::validation(format!(
                "Unknown weather provider '{other}'. Must be one of: google, weatherapi, openweather, visualcrossing"
            ))),
        }
    }
}

/// Current simplified weather for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// One of: sunny, partly cloudy, cloudy, light rain, heavy rain
    pub weather_type: SimplifiedWeatherType,
    pub group_id: String,
}

/// One step of a provider's time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub weather_type: SimplifiedWeatherType,
    pub temperature_celsius: f64,
    /// 0-100, zero when the provider omits it
    pub chance_of_rain_percent: f64,
}

/// Ordered forecast entries, in the order the provider returned them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub group_id: String,
    pub provider: WeatherProvider,
    pub entries: Vec<HourlyForecastEntry>,
}

/// Body of the weather endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherByGroupIdRequest {
    pub group_id: String,
    /// `YYYY-MM-DD`, honored by Visual Crossing only
    #[serde(default)]
    pub date: Option<String>,
}
