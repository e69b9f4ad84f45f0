//! In-memory store using a Tokio mutex, for single-node deployments and
//! tests.
//!
//! The mutex doubles as the per-link serialization point required by
//! `consume`: status derivation, counter increment, and log append all
//! happen under one lock acquisition.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::access::{AccessLogEntry, AccessLogFilter, NewAccessLogEntry};
use docvault_entity::share::{NewShareLink, ShareLink};

use crate::{AccessLogStore, ShareLinkStore};

/// Internal state shared by both store views.
#[derive(Debug, Default)]
struct InnerState {
    /// Links by ID.
    links: HashMap<Uuid, ShareLink>,
    /// Token to link-ID index.
    by_token: HashMap<String, Uuid>,
    /// Append-only access log.
    log: Vec<AccessLogEntry>,
}

/// In-memory implementation of both store contracts over one mutex.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareLinkStore for MemoryStore {
    async fn insert(&self, link: NewShareLink) -> AppResult<ShareLink> {
        let mut state = self.state.lock().await;

        if state.by_token.contains_key(&link.token) {
            return Err(AppError::conflict("Share token already exists"));
        }
        if state.links.contains_key(&link.id) {
            return Err(AppError::conflict("Share link ID already exists"));
        }

        let link = link.into_link();
        state.by_token.insert(link.token.clone(), link.id);
        state.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareLink>> {
        let state = self.state.lock().await;
        Ok(state.links.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        let state = self.state.lock().await;
        Ok(state
            .by_token
            .get(token)
            .and_then(|id| state.links.get(id))
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ShareLink>> {
        let state = self.state.lock().await;
        let mut links: Vec<ShareLink> = state
            .links
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<ShareLink> {
        let mut state = self.state.lock().await;
        let link = state
            .links
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        if link.revoked_at.is_none() {
            link.revoked_at = Some(at);
        }
        Ok(link.clone())
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
        entry: NewAccessLogEntry,
    ) -> AppResult<(ShareLink, AccessLogEntry)> {
        let mut state = self.state.lock().await;

        let id = *state
            .by_token
            .get(token)
            .ok_or_else(|| AppError::not_found("Share link not found"))?;
        let link = state
            .links
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        link.ensure_active(now)?;
        link.access_count += 1;
        let link = link.clone();

        let entry = entry.into_entry(Uuid::new_v4(), now);
        state.log.push(entry.clone());

        Ok((link, entry))
    }
}

#[async_trait]
impl AccessLogStore for MemoryStore {
    async fn append(&self, entry: NewAccessLogEntry) -> AppResult<AccessLogEntry> {
        let mut state = self.state.lock().await;
        let entry = entry.into_entry(Uuid::new_v4(), Utc::now());
        state.log.push(entry.clone());
        Ok(entry)
    }

    async fn query(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLogEntry>> {
        let state = self.state.lock().await;
        let mut matching: Vec<AccessLogEntry> = state
            .log
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn entries_for_token_since(
        &self,
        token: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AccessLogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .log
            .iter()
            .filter(|e| e.share_token.as_deref() == Some(token) && e.timestamp >= since)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use docvault_core::error::ErrorKind;
    use docvault_entity::access::{AccessAction, ActorIdentity};
    use docvault_entity::share::SharePermission;

    fn new_link(token: &str, max: Option<i32>) -> NewShareLink {
        let now = Utc::now();
        NewShareLink {
            id: Uuid::new_v4(),
            token: token.to_string(),
            document_ids: vec!["doc-1".to_string()],
            owner_id: Uuid::new_v4(),
            owner_email: "owner@clinic.example".to_string(),
            recipient_email: "dr.smith@hospital.example".to_string(),
            recipient_name: None,
            password_hash: None,
            permission: SharePermission::View,
            max_access_count: max,
            notify_on_access: false,
            created_at: now,
            expires_at: now + Duration::days(7),
        }
    }

    fn new_entry(token: &str) -> NewAccessLogEntry {
        NewAccessLogEntry {
            document_id: "doc-1".to_string(),
            document_name: "Blood Test Results".to_string(),
            action: AccessAction::View,
            actor: ActorIdentity::anonymous(),
            source_address: "192.168.1.100".to_string(),
            geo_location: "Unknown".to_string(),
            device: "Desktop - Chrome".to_string(),
            duration_ms: None,
            share_token: Some(token.to_string()),
            suspicious: false,
            suspicion_reason: None,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_token() {
        let store = MemoryStore::new();
        store.insert(new_link("tok-1", None)).await.unwrap();
        let err = store.insert(new_link("tok-1", None)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_and_keeps_first_timestamp() {
        let store = MemoryStore::new();
        let link = store.insert(new_link("tok-2", None)).await.unwrap();

        let first = store.revoke(link.id, Utc::now()).await.unwrap();
        let second = store
            .revoke(link.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(first.revoked_at, second.revoked_at);
    }

    #[tokio::test]
    async fn test_consume_increments_and_logs_atomically() {
        let store = MemoryStore::new();
        store.insert(new_link("tok-3", Some(1))).await.unwrap();

        let (link, entry) = store
            .consume("tok-3", Utc::now(), new_entry("tok-3"))
            .await
            .unwrap();
        assert_eq!(link.access_count, 1);
        assert_eq!(entry.share_token.as_deref(), Some("tok-3"));

        let err = store
            .consume("tok-3", Utc::now(), new_entry("tok-3"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Exhausted);

        // The failed attempt must not have logged anything.
        let history = store
            .entries_for_token_since("tok-3", Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_consume_unknown_token_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .consume("missing", Utc::now(), new_entry("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_query_filters_and_paginates() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store.append(new_entry("tok-4")).await.unwrap();
        }
        let mut flagged = new_entry("tok-4");
        flagged.suspicious = true;
        store.append(flagged).await.unwrap();

        let page = store
            .query(
                &AccessLogFilter {
                    suspicious: Some(true),
                    ..Default::default()
                },
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);

        let page = store
            .query(&AccessLogFilter::default(), &PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_items, 4);
        assert!(page.has_next);
    }
}
