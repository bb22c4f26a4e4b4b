//! Location model for stored group coordinates

use serde::{Deserialize, Serialize};

/// Geocoded coordinates for a store group, keyed by `group_id`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Unique identifier of the group/store, primary key of the store
    pub group_id: String,
    /// Address as submitted for geocoding
    pub address: String,
    /// Latitude in decimal degrees
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(rename = "long")]
    pub longitude: f64,
}

impl Location {
    #[must_use]
    pub fn new(group_id: String, address: String, latitude: f64, longitude: f64) -> Self {
        Self {
            group_id,
            address,
            latitude,
            longitude,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// `lat,lon` pair in the form most providers accept as a query value
    #[must_use]
    pub fn query_coordinates(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Body of `POST /locations`
#[derive(Debug, Clone, Deserialize)]
pub struct LocationCreateRequest {
    pub group_id: String,
    pub address: String,
}

impl LocationCreateRequest {
    pub fn validate(&self) -> crate::Result<()> {
        if self.group_id.trim().is_empty() {
            return Err(crate::StoreWeatherError::validation("group_id cannot be empty"));
        }
        if self.address.trim().is_empty() {
            return Err(crate::StoreWeatherError::validation("address cannot be empty"));
        }
        Ok(())
    }
}
