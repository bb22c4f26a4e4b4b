//! Document storage for locations and notifications
//!
//! Two backends: an embedded `fjall` database for deployments and an
//! in-memory map for tests and throwaway runs.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;
use crate::config::StorageConfig;
use crate::models::{Location, Notification};

pub mod fjall_store;
pub mod memory;

pub use fjall_store::FjallStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get(&self, group_id: &str) -> Result<Option<Location>>;

    /// Persist a new location. Fails with `LocationAlreadyExists` when the
    /// group id is taken.
    async fn create(&self, location: Location) -> Result<Location>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Notification>>;

    /// Insert or replace by id
    async fn insert(&self, notification: Notification) -> Result<()>;

    /// Every stored notification, unordered
    async fn list(&self) -> Result<Vec<Notification>>;

    /// Notifications `user_id` may see under `tenant_id`, optionally
    /// narrowed by a title keyword
    async fn find_visible(
        &self,
        tenant_id: &str,
        user_id: &str,
        keyword: Option<&str>,
    ) -> Result<Vec<Notification>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|n| n.is_visible_to(tenant_id, user_id))
            .filter(|n| keyword.is_none_or(|k| n.title_matches(k)))
            .collect())
    }
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Cheap round trip proving the store answers
    async fn ping(&self) -> Result<()>;
}

/// Handles onto one opened backend
#[derive(Clone)]
pub struct Stores {
    pub locations: Arc<dyn LocationStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    fn from_backend<S>(store: S) -> Self
    where
        S: LocationStore + NotificationStore + StoreHealth + 'static,
    {
        let store = Arc::new(store);
        Self {
            locations: store.clone(),
            notifications: store.clone(),
            health: store,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(MemoryStore::default())
    }

    /// Open the backend named in the storage settings
    pub fn open(config: &StorageConfig) -> Result<Self> {
        match config.backend.as_str() {
            "memory" => Ok(Self::in_memory()),
            _ => Ok(Self::from_backend(FjallStore::open(&config.path)?)),
        }
    }
}
