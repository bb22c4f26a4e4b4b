use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::{Notification, NotificationView, Page, PagingRequest};
use crate::store::NotificationStore;
use crate::{Result, StoreWeatherError};

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Lookup by id; the id must be a UUID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Notification>> {
        let id = Uuid::parse_str(id.trim())
            .map_err(|_| StoreWeatherError::validation(format!("'{id}' is not a valid id")))?;
        self.store.get_by_id(id).await
    }

    /// Visible notifications for the user, newest first, one page at a time
    #[instrument(skip(self, request), fields(page = request.page, page_size = request.page_size))]
    pub async fn list_for_user(
        &self,
        tenant_id: &str,
        user_id: &str,
        request: &PagingRequest,
    ) -> Result<Page<NotificationView>> {
        request.validate()?;

        let mut visible = self
            .store
            .find_visible(tenant_id, user_id, request.keyword())
            .await?;
        if visible.is_empty() {
            return Ok(Page::empty(request));
        }

        visible.sort_by_key(|n| Reverse(n.created_at));
        let total = visible.len() as u64;
        let items: Vec<NotificationView> = visible
            .iter()
            .skip(request.skip())
            .take(request.page_size as usize)
            .map(|n| n.view_for(user_id))
            .collect();
        debug!("Returning {} of {} notifications", items.len(), total);

        Ok(Page::new(items, request, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use crate::models::notification::fixtures::notification;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    async fn seeded(titles: &[&str]) -> (NotificationService, Vec<Notification>) {
        let store = Arc::new(MemoryStore::default());
        let now = Utc::now();
        let mut stored = Vec::new();
        for (age, title) in titles.iter().enumerate() {
            let n = notification(title, now - Duration::minutes(age as i64));
            store.insert(n.clone()).await.unwrap();
            stored.push(n);
        }
        (NotificationService::new(store), stored)
    }

    fn paging(page: u32, page_size: u32) -> PagingRequest {
        PagingRequest {
            keyword: None,
            page,
            page_size,
        }
    }

    #[tokio::test]
    async fn test_newest_first_with_paging() {
        let (service, stored) = seeded(&["a", "b", "c", "d", "e"]).await;

        let first = service.list_for_user("u1", "u1", &paging(1, 2)).await.unwrap();
        assert_eq!(first.total, 5);
        assert!(!first.is_full);
        assert_eq!(first.items[0].id, stored[0].id);
        assert_eq!(first.items[1].id, stored[1].id);

        let last = service.list_for_user("u1", "u1", &paging(3, 2)).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, stored[4].id);
        assert!(last.is_full);
    }

    #[tokio::test]
    async fn test_keyword_filters_before_counting() {
        let (service, _) = seeded(&["Long queue", "Smoke", "Queue cleared"]).await;
        let request = PagingRequest {
            keyword: Some("queue".to_string()),
            ..PagingRequest::default()
        };
        let page = service.list_for_user("u1", "u1", &request).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|n| {
            n.title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains("queue"))
        }));
    }

    #[tokio::test]
    async fn test_empty_result_is_full_page() {
        let (service, _) = seeded(&[]).await;
        let page = service
            .list_for_user("u1", "u1", &PagingRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert!(page.is_full);
    }

    #[tokio::test]
    async fn test_page_past_end_keeps_total() {
        let (service, _) = seeded(&["a", "b", "c"]).await;
        let page = service.list_for_user("u1", "u1", &paging(5, 10)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert!(page.is_full);
    }

    #[tokio::test]
    async fn test_invalid_paging_rejected() {
        let (service, _) = seeded(&["a"]).await;
        let err = service
            .list_for_user("u1", "u1", &paging(0, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (service, stored) = seeded(&["a"]).await;
        let found = service.get_by_id(&stored[0].id.to_string()).await.unwrap();
        assert_eq!(found, Some(stored[0].clone()));

        let missing = service.get_by_id(&Uuid::new_v4().to_string()).await.unwrap();
        assert!(missing.is_none());

        let err = service.get_by_id("not-a-uuid").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
    }
}
