//! Weather providers and the per-group weather facade
//!
//! Every lookup resolves the group's stored coordinates first, so an
//! unknown group never produces outbound traffic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::config::ProvidersConfig;
use crate::models::{
    HourlyForecast, HourlyForecastEntry, Location, SimplifiedWeatherType, WeatherProvider,
    WeatherSnapshot,
};
use crate::store::LocationStore;
use crate::{Result, StoreWeatherError};

pub mod conditions;
pub mod google;
pub mod http;
pub mod openweather;
pub mod visual_crossing;
pub mod weatherapi;

pub use conditions::normalize;
pub use google::GoogleWeatherClient;
pub use openweather::OpenWeatherClient;
pub use visual_crossing::VisualCrossingClient;
pub use weatherapi::WeatherApiClient;

/// A third-party weather API reduced to the simplified taxonomy
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn provider(&self) -> WeatherProvider;

    /// Current conditions at `location`; `date` is ignored by providers
    /// without day selection
    async fn current_weather(
        &self,
        location: &Location,
        date: Option<&str>,
    ) -> Result<SimplifiedWeatherType>;

    /// Provider time series in upstream order
    async fn hourly_forecast(
        &self,
        location: &Location,
        date: Option<&str>,
    ) -> Result<Vec<HourlyForecastEntry>>;
}

/// Build one pooled client per provider
pub fn build_sources(config: &ProvidersConfig) -> Result<Vec<Arc<dyn WeatherSource>>> {
    for provider in config.missing_keys() {
        warn!("No API key configured for {}, requests will be rejected upstream", provider);
    }
    Ok(vec![
        Arc::new(GoogleWeatherClient::new(&config.google)?),
        Arc::new(WeatherApiClient::new(&config.weatherapi)?),
        Arc::new(OpenWeatherClient::new(&config.openweather)?),
        Arc::new(VisualCrossingClient::new(&config.visualcrossing)?),
    ])
}

pub struct WeatherService {
    locations: Arc<dyn LocationStore>,
    sources: HashMap<WeatherProvider, Arc<dyn WeatherSource>>,
}

impl WeatherService {
    pub fn new(
        locations: Arc<dyn LocationStore>,
        sources: impl IntoIterator<Item = Arc<dyn WeatherSource>>,
    ) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.provider(), source))
            .collect();
        Self { locations, sources }
    }

    async fn resolve(
        &self,
        provider: WeatherProvider,
        group_id: &str,
    ) -> Result<(Location, &Arc<dyn WeatherSource>)> {
        let location = self
            .locations
            .get(group_id)
            .await?
            .ok_or_else(|| StoreWeatherError::location_not_found(group_id))?;
        let source = self.sources.get(&provider).ok_or_else(|| {
            StoreWeatherError::config(format!("{provider} is not configured"))
        })?;
        Ok((location, source))
    }

    /// Simplified current weather for a stored group
    #[instrument(skip(self))]
    pub async fn current_weather(
        &self,
        provider: WeatherProvider,
        group_id: &str,
        date: Option<&str>,
    ) -> Result<WeatherSnapshot> {
        let (location, source) = self.resolve(provider, group_id).await?;
        info!(
            "Fetching {} weather at {}",
            provider,
            location.format_coordinates()
        );
        let weather_type = source.current_weather(&location, date).await?;
        Ok(WeatherSnapshot {
            weather_type,
            group_id: location.group_id,
        })
    }

    /// Google current weather, the default provider
    pub async fn weather_by_group_id(&self, group_id: &str) -> Result<WeatherSnapshot> {
        self.current_weather(WeatherProvider::Google, group_id, None)
            .await
    }

    #[instrument(skip(self))]
    pub async fn hourly_forecast(
        &self,
        provider: WeatherProvider,
        group_id: &str,
        date: Option<&str>,
    ) -> Result<HourlyForecast> {
        let (location, source) = self.resolve(provider, group_id).await?;
        let entries = source.hourly_forecast(&location, date).await?;
        info!("{} returned {} forecast entries", provider, entries.len());
        Ok(HourlyForecast {
            group_id: location.group_id,
            provider,
            entries,
        })
    }
}
