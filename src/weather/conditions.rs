//! Provider condition tables and the weather normalizer
//!
//! Each provider speaks its own condition vocabulary: Google uses string
//! enums, WeatherAPI.com numeric codes, OpenWeather a numeric id plus a
//! coarse "main" category, Visual Crossing icon slugs. Everything here folds
//! those into [`SimplifiedWeatherType`]. Lookups never fail: a key missing
//! from a table resolves to [`DEFAULT_WEATHER_TYPE`].

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::LazyLock;

use crate::models::{SimplifiedWeatherType, WeatherProvider};

use crate::models::SimplifiedWeatherType::{Cloudy, HeavyRain, LightRain, PartlyCloudy, Sunny};

/// Result for any condition a table does not know
pub const DEFAULT_WEATHER_TYPE: SimplifiedWeatherType = Cloudy;

const GOOGLE: &[(&str, SimplifiedWeatherType)] = &[
    // clear
    ("CLEAR", Sunny),
    ("MOSTLY_CLEAR", Sunny),
    ("PARTLY_CLOUDY", PartlyCloudy),
    // cloudy
    ("MOSTLY_CLOUDY", Cloudy),
    ("CLOUDY", Cloudy),
    ("WINDY", Cloudy),
    // light rain
    ("LIGHT_RAIN", LightRain),
    ("LIGHT_RAIN_SHOWERS", LightRain),
    ("CHANCE_OF_SHOWERS", LightRain),
    ("SCATTERED_SHOWERS", LightRain),
    ("LIGHT_TO_MODERATE_RAIN", LightRain),
    // heavy rain
    ("RAIN", HeavyRain),
    ("RAIN_SHOWERS", HeavyRain),
    ("HEAVY_RAIN_SHOWERS", HeavyRain),
    ("MODERATE_TO_HEAVY_RAIN", HeavyRain),
    ("HEAVY_RAIN", HeavyRain),
    ("RAIN_PERIODICALLY_HEAVY", HeavyRain),
    ("WIND_AND_RAIN", HeavyRain),
    // thunder
    ("THUNDERSTORM", HeavyRain),
    ("THUNDERSHOWER", HeavyRain),
    ("LIGHT_THUNDERSTORM_RAIN", HeavyRain),
    ("SCATTERED_THUNDERSTORMS", HeavyRain),
    ("HEAVY_THUNDERSTORM", HeavyRain),
    // snow, folded onto the rain scale
    ("LIGHT_SNOW", LightRain),
    ("LIGHT_SNOW_SHOWERS", LightRain),
    ("CHANCE_OF_SNOW_SHOWERS", LightRain),
    ("SCATTERED_SNOW_SHOWERS", LightRain),
    ("LIGHT_TO_MODERATE_SNOW", LightRain),
    ("SNOW", HeavyRain),
    ("SNOW_SHOWERS", HeavyRain),
    ("HEAVY_SNOW_SHOWERS", HeavyRain),
    ("MODERATE_TO_HEAVY_SNOW", HeavyRain),
    ("HEAVY_SNOW", HeavyRain),
    ("SNOWSTORM", HeavyRain),
    ("SNOW_PERIODICALLY_HEAVY", HeavyRain),
    ("HEAVY_SNOW_STORM", HeavyRain),
    ("BLOWING_SNOW", HeavyRain),
    ("RAIN_AND_SNOW", HeavyRain),
    // hail
    ("HAIL", HeavyRain),
    ("HAIL_SHOWERS", HeavyRain),
    ("TYPE_UNSPECIFIED", Cloudy),
];

const WEATHERAPI: &[(u16, SimplifiedWeatherType)] = &[
    (1000, Sunny),        // Sunny / Clear
    (1003, PartlyCloudy), // Partly cloudy
    (1006, Cloudy),       // Cloudy
    (1009, Cloudy),       // Overcast
    (1030, Cloudy),       // Mist
    (1135, Cloudy),       // Fog
    (1147, Cloudy),       // Freezing fog
    // drizzle and light rain
    (1063, LightRain), // Patchy rain possible
    (1072, LightRain), // Patchy freezing drizzle possible
    (1150, LightRain), // Patchy light drizzle
    (1153, LightRain), // Light drizzle
    (1168, LightRain), // Freezing drizzle
    (1180, LightRain), // Patchy light rain
    (1183, LightRain), // Light rain
    (1198, LightRain), // Light freezing rain
    (1240, LightRain), // Light rain shower
    // moderate and heavy rain
    (1171, HeavyRain), // Heavy freezing drizzle
    (1186, HeavyRain), // Moderate rain at times
    (1189, HeavyRain), // Moderate rain
    (1192, HeavyRain), // Heavy rain at times
    (1195, HeavyRain), // Heavy rain
    (1201, HeavyRain), // Moderate or heavy freezing rain
    (1243, HeavyRain), // Moderate or heavy rain shower
    (1246, HeavyRain), // Torrential rain shower
    // thunder
    (1087, HeavyRain), // Thundery outbreaks possible
    (1273, HeavyRain), // Patchy light rain with thunder
    (1276, HeavyRain), // Moderate or heavy rain with thunder
    (1279, HeavyRain), // Patchy light snow with thunder
    (1282, HeavyRain), // Moderate or heavy snow with thunder
    // light snow
    (1066, LightRain), // Patchy snow possible
    (1210, LightRain), // Patchy light snow
    (1213, LightRain), // Light snow
    (1255, LightRain), // Light snow showers
    // moderate/heavy snow, sleet, ice pellets
    (1069, HeavyRain), // Patchy sleet possible
    (1114, HeavyRain), // Blowing snow
    (1117, HeavyRain), // Blizzard
    (1204, HeavyRain), // Light sleet
    (1207, HeavyRain), // Moderate or heavy sleet
    (1216, HeavyRain), // Patchy moderate snow
    (1219, HeavyRain), // Moderate snow
    (1222, HeavyRain), // Patchy heavy snow
    (1225, HeavyRain), // Heavy snow
    (1237, HeavyRain), // Ice pellets
    (1249, HeavyRain), // Light sleet showers
    (1252, HeavyRain), // Moderate or heavy sleet showers
    (1258, HeavyRain), // Moderate or heavy snow showers
    (1261, HeavyRain), // Light showers of ice pellets
    (1264, HeavyRain), // Moderate or heavy showers of ice pellets
];

const OPENWEATHER_IDS: &[(u16, SimplifiedWeatherType)] = &[
    (800, Sunny),
    (801, PartlyCloudy),
    (802, PartlyCloudy),
    (803, Cloudy),
    (804, Cloudy),
    (500, LightRain),
    (501, LightRain),
    (520, LightRain),
];

const OPENWEATHER_CATEGORIES: &[(&str, SimplifiedWeatherType)] = &[
    ("Clear", Sunny),
    ("Clouds", Cloudy),
    ("Drizzle", LightRain),
    ("Rain", HeavyRain),
    ("Thunderstorm", HeavyRain),
    ("Snow", HeavyRain),
    ("Mist", Cloudy),
    ("Smoke", Cloudy),
    ("Haze", Cloudy),
    ("Dust", Cloudy),
    ("Fog", Cloudy),
    ("Sand", Cloudy),
    ("Ash", Cloudy),
    ("Squall", HeavyRain),
    ("Tornado", HeavyRain),
];

const VISUALCROSSING: &[(&str, SimplifiedWeatherType)] = &[
    ("clear-day", Sunny),
    ("clear-night", Sunny),
    ("partly-cloudy-day", PartlyCloudy),
    ("partly-cloudy-night", PartlyCloudy),
    ("cloudy", Cloudy),
    ("fog", Cloudy),
    ("wind", Cloudy),
    ("showers-day", LightRain),
    ("showers-night", LightRain),
    ("rain", HeavyRain),
    ("thunder", HeavyRain),
    ("thunder-rain", HeavyRain),
    ("thunder-showers-day", HeavyRain),
    ("thunder-showers-night", HeavyRain),
    ("snow", HeavyRain),
    ("snow-showers-day", HeavyRain),
    ("snow-showers-night", HeavyRain),
    ("rain-snow", HeavyRain),
    ("rain-snow-showers-day", HeavyRain),
    ("rain-snow-showers-night", HeavyRain),
    ("sleet", HeavyRain),
    ("hail", HeavyRain),
];

static GOOGLE_TABLE: LazyLock<HashMap<&'static str, SimplifiedWeatherType>> =
    LazyLock::new(|| GOOGLE.iter().copied().collect());
static WEATHERAPI_TABLE: LazyLock<HashMap<u16, SimplifiedWeatherType>> =
    LazyLock::new(|| WEATHERAPI.iter().copied().collect());
static OPENWEATHER_ID_TABLE: LazyLock<HashMap<u16, SimplifiedWeatherType>> =
    LazyLock::new(|| OPENWEATHER_IDS.iter().copied().collect());
static OPENWEATHER_CATEGORY_TABLE: LazyLock<HashMap<&'static str, SimplifiedWeatherType>> =
    LazyLock::new(|| OPENWEATHER_CATEGORIES.iter().copied().collect());
static VISUALCROSSING_TABLE: LazyLock<HashMap<&'static str, SimplifiedWeatherType>> =
    LazyLock::new(|| VISUALCROSSING.iter().copied().collect());

/// Single lookup-with-default used by every provider table
fn lookup_or_default<K, Q>(table: &HashMap<K, SimplifiedWeatherType>, key: &Q) -> SimplifiedWeatherType
where
    K: Borrow<Q> + Eq + Hash,
    Q: Eq + Hash + ?Sized,
{
    table.get(key).copied().unwrap_or(DEFAULT_WEATHER_TYPE)
}

/// Raw condition signal as extracted from a provider payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCondition<'a> {
    /// String code or icon slug
    Text(&'a str),
    /// Numeric condition code
    Code(i64),
    /// OpenWeather-style specific id with a coarse category
    Classified {
        id: Option<i64>,
        category: Option<&'a str>,
    },
}

impl<'a> From<&'a str> for RawCondition<'a> {
    fn from(value: &'a str) -> Self {
        RawCondition::Text(value)
    }
}

impl From<i64> for RawCondition<'_> {
    fn from(value: i64) -> Self {
        RawCondition::Code(value)
    }
}

impl From<u16> for RawCondition<'_> {
    fn from(value: u16) -> Self {
        RawCondition::Code(i64::from(value))
    }
}

/// Fold a provider condition into the simplified taxonomy.
///
/// Never fails. Text handed to a numeric provider is parsed first, and for
/// OpenWeather a numeric text is read as an id, anything else as a category.
pub fn normalize<'a>(
    provider: WeatherProvider,
    raw: impl Into<RawCondition<'a>>,
) -> SimplifiedWeatherType {
    let raw = raw.into();
    match provider {
        WeatherProvider::Google => match raw {
            RawCondition::Text(key) => google_weather_type(key),
            RawCondition::Classified {
                category: Some(key),
                ..
            } => google_weather_type(key),
            _ => DEFAULT_WEATHER_TYPE,
        },
        WeatherProvider::WeatherApi => match raw {
            RawCondition::Code(code) | RawCondition::Classified { id: Some(code), .. } => {
                u16::try_from(code).map_or(DEFAULT_WEATHER_TYPE, weatherapi_weather_type)
            }
            RawCondition::Text(text) => text
                .trim()
                .parse::<u16>()
                .map_or(DEFAULT_WEATHER_TYPE, weatherapi_weather_type),
            RawCondition::Classified { id: None, .. } => DEFAULT_WEATHER_TYPE,
        },
        WeatherProvider::OpenWeather => match raw {
            RawCondition::Classified { id, category } => {
                openweather_weather_type(id.and_then(|id| u16::try_from(id).ok()), category)
            }
            RawCondition::Code(code) => openweather_weather_type(u16::try_from(code).ok(), None),
            RawCondition::Text(text) => match text.trim().parse::<u16>() {
                Ok(id) => openweather_weather_type(Some(id), None),
                Err(_) => openweather_weather_type(None, Some(text.trim())),
            },
        },
        WeatherProvider::VisualCrossing => match raw {
            RawCondition::Text(icon) => visualcrossing_weather_type(icon),
            RawCondition::Classified {
                category: Some(icon),
                ..
            } => visualcrossing_weather_type(icon),
            _ => DEFAULT_WEATHER_TYPE,
        },
    }
}

/// Google Weather `weatherCondition.type`
#[must_use]
pub fn google_weather_type(condition: &str) -> SimplifiedWeatherType {
    lookup_or_default(&*GOOGLE_TABLE, condition)
}

/// WeatherAPI.com `condition.code`
#[must_use]
pub fn weatherapi_weather_type(code: u16) -> SimplifiedWeatherType {
    lookup_or_default(&*WEATHERAPI_TABLE, &code)
}

/// OpenWeather `weather[0]`: the specific id wins, the category is the fallback
#[must_use]
pub fn openweather_weather_type(id: Option<u16>, category: Option<&str>) -> SimplifiedWeatherType {
    if let Some(simplified) = id.and_then(|id| OPENWEATHER_ID_TABLE.get(&id)) {
        return *simplified;
    }
    match category {
        Some(category) => lookup_or_default(&*OPENWEATHER_CATEGORY_TABLE, category),
        None => DEFAULT_WEATHER_TYPE,
    }
}

/// Visual Crossing `icon`
#[must_use]
pub fn visualcrossing_weather_type(icon: &str) -> SimplifiedWeatherType {
    lookup_or_default(&*VISUALCROSSING_TABLE, icon)
}
