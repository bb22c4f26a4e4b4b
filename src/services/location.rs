use std::sync::Arc;

use tracing::{info, instrument};

use crate::Result;
use crate::geocode::Geocoder;
use crate::models::{Location, LocationCreateRequest};
use crate::store::LocationStore;

pub struct LocationService {
    store: Arc<dyn LocationStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationService {
    pub fn new(store: Arc<dyn LocationStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Geocode the address and store the coordinates under the group id.
    ///
    /// The group id is stored exactly as received, so later lookups must use
    /// the same string. An already registered group is rejected before
    /// geocoding.
    #[instrument(skip(self, request), fields(group_id = %request.group_id))]
    pub async fn create(&self, request: LocationCreateRequest) -> Result<Location> {
        request.validate()?;
        let group_id = request.group_id;

        if self.store.get(&group_id).await?.is_some() {
            return Err(crate::StoreWeatherError::LocationAlreadyExists { group_id });
        }

        let (latitude, longitude) = self.geocoder.geocode(&request.address).await?;
        let location = self
            .store
            .create(Location::new(group_id, request.address, latitude, longitude))
            .await?;
        info!("Registered location at {}", location.format_coordinates());
        Ok(location)
    }

    pub async fn get(&self, group_id: &str) -> Result<Option<Location>> {
        self.store.get(group_id).await
    }
}
