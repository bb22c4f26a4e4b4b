//! Process-wide state shared by every request handler

use std::sync::Arc;

use tracing::info;

use crate::Result;
use crate::auth::JwtAuth;
use crate::config::StoreWeatherConfig;
use crate::geocode::{Geocoder, GoogleGeocoder};
use crate::services::{LocationService, NotificationService};
use crate::store::{StoreHealth, Stores};
use crate::weather::{WeatherService, WeatherSource, build_sources};

pub struct AppState {
    pub weather: WeatherService,
    pub locations: LocationService,
    pub notifications: NotificationService,
    pub health: Arc<dyn StoreHealth>,
    pub auth: JwtAuth,
}

impl AppState {
    /// Wire state from already constructed parts
    pub fn new(
        stores: Stores,
        geocoder: Arc<dyn Geocoder>,
        sources: Vec<Arc<dyn WeatherSource>>,
        auth: JwtAuth,
    ) -> Self {
        Self {
            weather: WeatherService::new(stores.locations.clone(), sources),
            locations: LocationService::new(stores.locations, geocoder),
            notifications: NotificationService::new(stores.notifications),
            health: stores.health,
            auth,
        }
    }

    /// Open the store and build every outbound client from configuration
    pub fn from_config(config: &StoreWeatherConfig) -> Result<Self> {
        let stores = Stores::open(&config.storage)?;
        info!(
            "Opened {} storage at {}",
            config.storage.backend, config.storage.path
        );
        let geocoder = Arc::new(GoogleGeocoder::new(&config.geocoding)?);
        let sources = build_sources(&config.providers)?;
        Ok(Self::new(
            stores,
            geocoder,
            sources,
            JwtAuth::new(config.auth.secret_key.clone()),
        ))
    }
}
