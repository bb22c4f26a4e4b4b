use std::path::Path;

use async_trait::async_trait;
use fjall::Keyspace;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{LocationStore, NotificationStore, StoreHealth};
use crate::models::{Location, Notification};
use crate::{Result, StoreWeatherError};

const PING_KEY: &[u8] = b"__ping__";

pub struct FjallStore {
    locations: Keyspace,
    notifications: Keyspace,
    // serializes the location existence check and insert
    write_lock: Mutex<()>,
}

fn read_bytes(keyspace: Keyspace, key: Vec<u8>) -> fjall::Result<Option<Vec<u8>>> {
    Ok(keyspace.get(key)?.map(|v| v.to_vec()))
}

fn read_all_values(keyspace: Keyspace) -> fjall::Result<Vec<Vec<u8>>> {
    keyspace
        .iter()
        .map(|guard| guard.value().map(|v| v.to_vec()))
        .collect()
}

impl FjallStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let locations = db.keyspace("locations", fjall::KeyspaceCreateOptions::default)?;
        let notifications = db.keyspace("notifications", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self {
            locations,
            notifications,
            write_lock: Mutex::new(()),
        })
    }

    async fn read<T: DeserializeOwned>(keyspace: &Keyspace, key: &[u8]) -> Result<Option<T>> {
        let keyspace = keyspace.clone();
        let key = key.to_vec();
        let bytes = task::spawn_blocking(move || read_bytes(keyspace, key)).await??;
        match bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize>(keyspace: &Keyspace, key: &[u8], value: &T) -> Result<()> {
        let keyspace = keyspace.clone();
        let key = key.to_vec();
        let bytes = postcard::to_stdvec(value)
            .map_err(|e| StoreWeatherError::storage(format!("Failed to encode document: {e}")))?;
        task::spawn_blocking(move || keyspace.insert(key, bytes)).await??;
        Ok(())
    }
}

#[async_trait]
impl LocationStore for FjallStore {
    #[instrument(name = "get_location", level = "debug", skip(self))]
    async fn get(&self, group_id: &str) -> Result<Option<Location>> {
        Self::read(&self.locations, group_id.as_bytes()).await
    }

    #[instrument(name = "create_location", level = "debug", skip(self, location), fields(group_id = %location.group_id))]
    async fn create(&self, location: Location) -> Result<Location> {
        let _guard = self.write_lock.lock().await;
        let key = location.group_id.as_bytes();
        if Self::read::<Location>(&self.locations, key).await?.is_some() {
            return Err(StoreWeatherError::LocationAlreadyExists {
                group_id: location.group_id.clone(),
            });
        }
        Self::write(&self.locations, key, &location).await?;
        debug!("Location stored");
        Ok(location)
    }
}

#[async_trait]
impl NotificationStore for FjallStore {
    #[instrument(name = "get_notification", level = "debug", skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Notification>> {
        Self::read(&self.notifications, id.as_bytes()).await
    }

    #[instrument(name = "insert_notification", level = "debug", skip(self, notification), fields(id = %notification.id))]
    async fn insert(&self, notification: Notification) -> Result<()> {
        Self::write(&self.notifications, notification.id.as_bytes(), &notification).await
    }

    #[instrument(name = "list_notifications", level = "debug", skip(self))]
    async fn list(&self) -> Result<Vec<Notification>> {
        let keyspace = self.notifications.clone();
        let values = task::spawn_blocking(move || read_all_values(keyspace)).await??;
        let notifications = values
            .iter()
            .map(|bytes| postcard::from_bytes(bytes))
            .collect::<std::result::Result<Vec<Notification>, _>>()?;
        debug!("Loaded {} notifications", notifications.len());
        Ok(notifications)
    }
}

#[async_trait]
impl StoreHealth for FjallStore {
    async fn ping(&self) -> Result<()> {
        let keyspace = self.locations.clone();
        task::spawn_blocking(move || read_bytes(keyspace, PING_KEY.to_vec())).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::fixtures::notification;
    use chrono::{Duration, Utc};

    fn open_temp() -> (tempfile::TempDir, FjallStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FjallStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_location_roundtrip_and_duplicate() {
        let (_dir, store) = open_temp();
        let location = Location::new("G1".to_string(), "1 Main St".to_string(), 10.0, 106.0);

        store.create(location.clone()).await.unwrap();
        assert_eq!(store.get("G1").await.unwrap(), Some(location.clone()));
        assert_eq!(store.get("G2").await.unwrap(), None);

        let err = store.create(location).await.unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::LocationAlreadyExists);
    }

    #[tokio::test]
    async fn test_notifications_listed_from_keyspace() {
        let (_dir, store) = open_temp();
        let first = notification("Queue alert", Utc::now() - Duration::minutes(5));
        let second = notification("Smoke alert", Utc::now());

        store.insert(first.clone()).await.unwrap();
        store.insert(second.clone()).await.unwrap();
        // re-inserting replaces the stored document
        store.insert(first.clone()).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&first));
        assert!(all.contains(&second));
        assert_eq!(store.get_by_id(second.id).await.unwrap(), Some(second));
        assert_eq!(store.get_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_visible_applies_keyword() {
        let (_dir, store) = open_temp();
        store
            .insert(notification("Long queue at checkout", Utc::now()))
            .await
            .unwrap();
        store
            .insert(notification("Zone overcrowded", Utc::now()))
            .await
            .unwrap();

        let found = store.find_visible("u1", "u1", Some("QUEUE")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title.as_deref(), Some("Long queue at checkout"));
    }

    #[tokio::test]
    async fn test_ping() {
        let (_dir, store) = open_temp();
        assert!(store.ping().await.is_ok());
    }
}
