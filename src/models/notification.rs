//! Notification documents and the per-user view served to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ProductZoneOvercrowded,
    CheckoutDelay,
    LongQueueDetected,
    UnattendedItemsDetected,
    // older producers wrote the misspelled value
    #[serde(alias = "smoke_fire_etected")]
    SmokeFireDetected,
    TrafficInsight,
    Info,
    Undefine,
}

/// Camera/zone payload attached to a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    pub cam_id: String,
    pub zone_id: String,
    pub image: Option<String>,
    pub duration_second: Option<i64>,
    pub people_count: Option<i64>,
    pub avg_dwell_time: Option<i64>,
}

/// Stored notification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub data: NotificationData,
    pub status: NotificationStatus,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub users_read: Vec<String>,
    #[serde(default)]
    pub users_delete: Vec<String>,
    pub has_for_all: bool,
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    pub store_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Whether `user_id` may see this notification under `tenant_id`.
    ///
    /// Deleted-by-user always hides. Broadcasts are visible to everyone;
    /// targeted ones need a matching tenant and either a matching or an
    /// unset `user_id`.
    #[must_use]
    pub fn is_visible_to(&self, tenant_id: &str, user_id: &str) -> bool {
        if self.users_delete.iter().any(|u| u == user_id) {
            return false;
        }
        if self.has_for_all {
            return true;
        }
        let user_matches = match &self.user_id {
            Some(owner) => owner == user_id,
            None => true,
        };
        self.tenant_id.as_deref() == Some(tenant_id) && user_matches
    }

    /// Case-insensitive substring match on the title
    #[must_use]
    pub fn title_matches(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(&needle))
    }

    #[must_use]
    pub fn view_for(&self, user_id: &str) -> NotificationView {
        NotificationView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            kind: self.kind,
            created_at: self.created_at,
            is_read: self.users_read.iter().any(|u| u == user_id),
        }
    }
}

/// Notification as listed for a specific user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: NotificationStatus,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}
