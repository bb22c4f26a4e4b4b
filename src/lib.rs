//! `StoreWeather` - store locations, simplified weather and notifications
//!
//! This library geocodes store addresses, folds the condition vocabularies
//! of several weather providers into five simple weather types, and serves
//! per-user notification listings over HTTP.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod geocode;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::StoreWeatherConfig;
pub use error::{ErrorCode, StoreWeatherError};
pub use models::{
    HourlyForecast, HourlyForecastEntry, Location, Notification, SimplifiedWeatherType,
    WeatherProvider, WeatherSnapshot,
};
pub use state::AppState;
pub use weather::{WeatherService, WeatherSource, normalize};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, StoreWeatherError>;
