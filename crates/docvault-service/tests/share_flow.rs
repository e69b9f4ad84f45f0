//! End-to-end share link flows over the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use docvault_core::config::audit::AuditConfig;
use docvault_core::config::sharing::SharingConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::access::{AccessAction, AccessLogEntry, AccessLogFilter, NewAccessLogEntry};
use docvault_entity::share::{LinkStatus, NewShareLink, ShareLink, SharePermission};
use docvault_service::{
    AccessAuditor, AccessLogService, AccessorContext, ConsumeRequest, CreateShareLinkRequest,
    LogNotifier, OwnerContext, PasswordHasher, ShareLinkService,
};
use docvault_store::memory::MemoryStore;
use docvault_store::{AccessLogStore, ShareLinkStore};

fn service(store: &Arc<MemoryStore>) -> ShareLinkService {
    service_with(Arc::clone(store) as Arc<dyn ShareLinkStore>, store)
}

fn service_with(link_store: Arc<dyn ShareLinkStore>, store: &Arc<MemoryStore>) -> ShareLinkService {
    let log_store = Arc::clone(store) as Arc<dyn AccessLogStore>;
    let auditor = Arc::new(AccessAuditor::new(
        Arc::clone(&log_store),
        AuditConfig::default(),
    ));
    ShareLinkService::new(
        link_store,
        Arc::new(AccessLogService::new(log_store)),
        auditor,
        Arc::new(PasswordHasher::new()),
        Arc::new(LogNotifier::new()),
        SharingConfig::default(),
    )
}

/// Store wrapper that fails a set number of calls before delegating.
struct FailingShareLinkStore {
    inner: Arc<MemoryStore>,
    insert_conflicts: AtomicU32,
    transient_failures: AtomicU32,
}

impl FailingShareLinkStore {
    fn new(inner: Arc<MemoryStore>, insert_conflicts: u32, transient_failures: u32) -> Self {
        Self {
            inner,
            insert_conflicts: AtomicU32::new(insert_conflicts),
            transient_failures: AtomicU32::new(transient_failures),
        }
    }

    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ShareLinkStore for FailingShareLinkStore {
    async fn insert(&self, link: NewShareLink) -> AppResult<ShareLink> {
        if Self::take(&self.insert_conflicts) {
            return Err(AppError::conflict("Share token already exists"));
        }
        self.inner.insert(link).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareLink>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        self.inner.find_by_token(token).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ShareLink>> {
        self.inner.list_by_owner(owner_id).await
    }

    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<ShareLink> {
        self.inner.revoke(id, at).await
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
        entry: NewAccessLogEntry,
    ) -> AppResult<(ShareLink, AccessLogEntry)> {
        if Self::take(&self.transient_failures) {
            return Err(AppError::transient_store("connection pool timed out"));
        }
        self.inner.consume(token, now, entry).await
    }
}

fn owner() -> OwnerContext {
    OwnerContext {
        owner_id: Uuid::new_v4(),
        email: "owner@clinic.example".to_string(),
        name: "Sam Rivera".to_string(),
        source_address: "192.168.1.10".to_string(),
        user_agent: Some("Mozilla/5.0 (Windows NT 10.0) Chrome/126.0".to_string()),
    }
}

fn accessor(source: &str) -> AccessorContext {
    AccessorContext {
        name: None,
        email: None,
        source_address: source.to_string(),
        geo_location: None,
        user_agent: None,
    }
}

fn create_request() -> CreateShareLinkRequest {
    CreateShareLinkRequest {
        document_ids: vec!["doc-1".to_string(), "doc-2".to_string()],
        recipient_email: "dr.smith@hospital.example".to_string(),
        recipient_name: Some("Dr. Smith".to_string()),
        expires_in_seconds: 7 * 24 * 3600,
        max_access_count: None,
        password: None,
        permission: SharePermission::ViewAndDownload,
        notify_on_access: false,
    }
}

fn view_request(document_id: &str) -> ConsumeRequest {
    ConsumeRequest {
        action: AccessAction::View,
        document_id: document_id.to_string(),
        document_name: None,
        password: None,
        duration_ms: None,
    }
}

#[tokio::test]
async fn test_create_validate_consume_flow() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    assert_eq!(created.status, LinkStatus::Active);
    assert_eq!(created.link.access_count, 0);
    assert!(created.share_url.ends_with(&created.link.token));

    let validated = svc.validate(&created.link.token, None).await.unwrap();
    assert_eq!(validated.status, LinkStatus::Active);
    // Validation must not consume the budget.
    assert_eq!(validated.link.access_count, 0);

    let entry = svc
        .consume(
            &created.link.token,
            &accessor("203.0.113.9"),
            view_request("doc-1"),
        )
        .await
        .unwrap();
    assert_eq!(entry.action, AccessAction::View);
    assert_eq!(entry.share_token.as_deref(), Some(created.link.token.as_str()));

    let after = svc
        .get(created.link.owner_id, created.link.id)
        .await
        .unwrap();
    assert_eq!(after.link.access_count, 1);
}

#[tokio::test]
async fn test_each_consume_writes_exactly_one_log_entry() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    svc.consume(
        &created.link.token,
        &accessor("203.0.113.9"),
        view_request("doc-2"),
    )
    .await
    .unwrap();

    let page = store
        .query(
            &AccessLogFilter {
                share_token: Some(created.link.token.clone()),
                ..Default::default()
            },
            &Default::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].document_id, "doc-2");
    assert_eq!(page.items[0].action, AccessAction::View);
}

#[tokio::test]
async fn test_create_records_owner_share_entries() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);
    let who = owner();

    svc.create(&who, create_request()).await.unwrap();

    let page = store
        .query(
            &AccessLogFilter {
                action: Some(AccessAction::Share),
                actor_email: Some(who.email.clone()),
                ..Default::default()
            },
            &Default::default(),
        )
        .await
        .unwrap();
    // One entry per covered document, none flagged.
    assert_eq!(page.total_items, 2);
    assert!(page.items.iter().all(|e| !e.suspicious));
    assert!(page.items.iter().all(|e| e.share_token.is_none()));
}

#[tokio::test]
async fn test_concurrent_consumption_never_exceeds_budget() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let mut req = create_request();
    req.max_access_count = Some(3);
    let created = svc.create(&owner(), req).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let svc = svc.clone();
        let token = created.link.token.clone();
        handles.push(tokio::spawn(async move {
            svc.consume(&token, &accessor("203.0.113.9"), view_request("doc-1"))
                .await
        }));
    }

    let mut ok = 0;
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => {
                assert_eq!(e.kind, ErrorKind::Exhausted);
                exhausted += 1;
            }
        }
    }
    assert_eq!(ok, 3);
    assert_eq!(exhausted, 7);

    let link = store
        .find_by_token(&created.link.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.access_count, 3);

    // Failed attempts must not have left log entries behind.
    let history = store
        .entries_for_token_since(&created.link.token, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn test_expiry_beats_remaining_budget() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let now = Utc::now();
    let link = store
        .insert(NewShareLink {
            id: Uuid::new_v4(),
            token: "expired-token".to_string(),
            document_ids: vec!["doc-1".to_string()],
            owner_id: Uuid::new_v4(),
            owner_email: "owner@clinic.example".to_string(),
            recipient_email: "dr.smith@hospital.example".to_string(),
            recipient_name: None,
            password_hash: None,
            permission: SharePermission::View,
            max_access_count: Some(10),
            notify_on_access: false,
            created_at: now - Duration::days(8),
            expires_at: now - Duration::days(1),
        })
        .await
        .unwrap();

    let err = svc
        .consume(&link.token, &accessor("203.0.113.9"), view_request("doc-1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Expired);

    // The rejected attempt consumed nothing and logged nothing.
    let link = store.find_by_token(&link.token).await.unwrap().unwrap();
    assert_eq!(link.access_count, 0);
    let history = store
        .entries_for_token_since(&link.token, now - Duration::days(30))
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_revoke_is_idempotent_and_blocks_consumption() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);
    let who = owner();

    let created = svc.create(&who, create_request()).await.unwrap();
    svc.revoke(who.owner_id, created.link.id).await.unwrap();
    svc.revoke(who.owner_id, created.link.id).await.unwrap();

    let view = svc.get(who.owner_id, created.link.id).await.unwrap();
    assert_eq!(view.status, LinkStatus::Revoked);

    let err = svc
        .consume(
            &created.link.token,
            &accessor("203.0.113.9"),
            view_request("doc-1"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Revoked);
}

#[tokio::test]
async fn test_only_the_owner_can_revoke() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    let err = svc
        .revoke(Uuid::new_v4(), created.link.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_password_protected_link() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let mut req = create_request();
    req.password = Some("correct horse battery".to_string());
    let created = svc.create(&owner(), req).await.unwrap();

    let err = svc.validate(&created.link.token, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let err = svc
        .validate(&created.link.token, Some("wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    svc.validate(&created.link.token, Some("correct horse battery"))
        .await
        .unwrap();

    let mut consume = view_request("doc-1");
    consume.password = Some("correct horse battery".to_string());
    svc.consume(&created.link.token, &accessor("203.0.113.9"), consume)
        .await
        .unwrap();

    // Failed password attempts must not have consumed the budget.
    let link = store
        .find_by_token(&created.link.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.access_count, 1);
}

#[tokio::test]
async fn test_download_denied_on_view_only_link() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let mut req = create_request();
    req.permission = SharePermission::View;
    let created = svc.create(&owner(), req).await.unwrap();

    let mut consume = view_request("doc-1");
    consume.action = AccessAction::Download;
    let err = svc
        .consume(&created.link.token, &accessor("203.0.113.9"), consume)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    // A denied download consumes nothing and logs nothing.
    let link = store
        .find_by_token(&created.link.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.access_count, 0);
    let history = store
        .entries_for_token_since(&created.link.token, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_document_outside_link_scope_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    let err = svc
        .consume(
            &created.link.token,
            &accessor("203.0.113.9"),
            view_request("doc-99"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_burst_consumption_is_flagged() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    for _ in 0..6 {
        svc.consume(
            &created.link.token,
            &accessor("203.0.113.9"),
            view_request("doc-1"),
        )
        .await
        .unwrap();
    }

    let page = store
        .query(
            &AccessLogFilter {
                share_token: Some(created.link.token.clone()),
                suspicious: Some(true),
                ..Default::default()
            },
            &Default::default(),
        )
        .await
        .unwrap();
    assert!(page.total_items >= 1);
    assert!(
        page.items[0]
            .suspicion_reason
            .as_deref()
            .unwrap()
            .contains("Burst detection")
    );
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);
    let who = owner();

    let mut req = create_request();
    req.document_ids.clear();
    let err = svc.create(&who, req).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let mut req = create_request();
    req.recipient_email = "not-an-email".to_string();
    let err = svc.create(&who, req).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let mut req = create_request();
    req.expires_in_seconds = 0;
    let err = svc.create(&who, req).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let mut req = create_request();
    req.max_access_count = Some(0);
    let err = svc.create(&who, req).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_share_action_does_not_consume() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    let mut consume = view_request("doc-1");
    consume.action = AccessAction::Share;
    let err = svc
        .consume(&created.link.token, &accessor("203.0.113.9"), consume)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_list_filters_by_derived_status() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(&store);
    let who = owner();

    let active = svc.create(&who, create_request()).await.unwrap();
    let revoked = svc.create(&who, create_request()).await.unwrap();
    svc.revoke(who.owner_id, revoked.link.id).await.unwrap();

    let all = svc.list(who.owner_id, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let active_only = svc
        .list(who.owner_id, Some(LinkStatus::Active))
        .await
        .unwrap();
    assert_eq!(active_only.len(), 1);
    assert_eq!(active_only[0].link.id, active.link.id);

    let revoked_only = svc
        .list(who.owner_id, Some(LinkStatus::Revoked))
        .await
        .unwrap();
    assert_eq!(revoked_only.len(), 1);
    assert_eq!(revoked_only[0].link.id, revoked.link.id);
}

#[tokio::test]
async fn test_token_collision_reissues_until_insert_succeeds() {
    let store = Arc::new(MemoryStore::new());
    let failing = Arc::new(FailingShareLinkStore::new(Arc::clone(&store), 2, 0));
    let svc = service_with(failing, &store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    assert_eq!(created.status, LinkStatus::Active);
    assert!(
        store
            .find_by_token(&created.link.token)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_token_collision_surfaces_conflict_once_reissues_run_out() {
    let store = Arc::new(MemoryStore::new());
    let failing = Arc::new(FailingShareLinkStore::new(Arc::clone(&store), u32::MAX, 0));
    let svc = service_with(failing, &store);

    let err = svc.create(&owner(), create_request()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_consume_retries_transient_store_failures() {
    let store = Arc::new(MemoryStore::new());
    let failing = Arc::new(FailingShareLinkStore::new(Arc::clone(&store), 0, 2));
    let svc = service_with(failing, &store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    svc.consume(
        &created.link.token,
        &accessor("203.0.113.9"),
        view_request("doc-1"),
    )
    .await
    .unwrap();

    // The retried consumption landed exactly once.
    let link = store
        .find_by_token(&created.link.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.access_count, 1);
    let history = store
        .entries_for_token_since(&created.link.token, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_consume_surfaces_transient_error_once_retries_run_out() {
    let store = Arc::new(MemoryStore::new());
    let failing = Arc::new(FailingShareLinkStore::new(Arc::clone(&store), 0, u32::MAX));
    let svc = service_with(failing, &store);

    let created = svc.create(&owner(), create_request()).await.unwrap();
    let err = svc
        .consume(
            &created.link.token,
            &accessor("203.0.113.9"),
            view_request("doc-1"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransientStore);

    // Nothing was consumed or logged.
    let link = store
        .find_by_token(&created.link.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.access_count, 0);
}
