//! Data models for the `StoreWeather` service
//!
//! This module contains the core domain models organized by concern:
//! - Location: geocoded group coordinates
//! - Weather: the simplified weather taxonomy and forecast shapes
//! - Notification: stored notifications and their per-user view
//! - Paging: paged request/response wrappers

pub mod location;
pub mod notification;
pub mod paging;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{Location, LocationCreateRequest};
pub use notification::{
    Notification, NotificationData, NotificationStatus, NotificationType, NotificationView,
};
pub use paging::{Page, PagingRequest};
pub use weather::{
    HourlyForecast, HourlyForecastEntry, SimplifiedWeatherType, WeatherByGroupIdRequest,
    WeatherProvider, WeatherSnapshot,
};
