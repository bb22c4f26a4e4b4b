use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LocationStore, NotificationStore, StoreHealth};
use crate::models::{Location, Notification};
use crate::{Result, StoreWeatherError};

#[derive(Default)]
pub struct MemoryStore {
    locations: RwLock<HashMap<String, Location>>,
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn get(&self, group_id: &str) -> Result<Option<Location>> {
        Ok(self.locations.read().await.get(group_id).cloned())
    }

    async fn create(&self, location: Location) -> Result<Location> {
        match self.locations.write().await.entry(location.group_id.clone()) {
            Entry::Occupied(_) => Err(StoreWeatherError::LocationAlreadyExists {
                group_id: location.group_id,
            }),
            Entry::Vacant(slot) => Ok(slot.insert(location).clone()),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        Ok(self.notifications.read().await.get(&id).cloned())
    }

    async fn insert(&self, notification: Notification) -> Result<()> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Notification>> {
        Ok(self.notifications.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
