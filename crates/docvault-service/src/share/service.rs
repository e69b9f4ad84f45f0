//! Share link lifecycle service: create, validate, consume, revoke, list.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use docvault_core::config::sharing::SharingConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::events::ShareEvent;
use docvault_core::result::AppResult;
use docvault_entity::access::{AccessAction, AccessLogEntry, NewAccessLogEntry};
use docvault_entity::share::{LinkStatus, NewShareLink, ShareLink, SharePermission};
use docvault_store::ShareLinkStore;

use crate::audit::{AccessAuditor, AccessLogService};
use crate::context::{AccessorContext, OwnerContext};
use crate::notify::Notifier;
use crate::password::PasswordHasher;
use crate::share::token::TokenIssuer;

/// Request to create a new share link.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateShareLinkRequest {
    /// Documents covered by the link. Must be non-empty.
    pub document_ids: Vec<String>,
    /// Recipient email address.
    pub recipient_email: String,
    /// Recipient display name (optional).
    pub recipient_name: Option<String>,
    /// Link lifetime from now, in seconds. Must be positive.
    pub expires_in_seconds: i64,
    /// Access ceiling (None = unlimited). Must be positive when set.
    pub max_access_count: Option<i32>,
    /// Share password (optional). Only its hash is stored.
    pub password: Option<String>,
    /// Permission level granted.
    pub permission: SharePermission,
    /// Notify the owner when the link is accessed.
    pub notify_on_access: bool,
}

/// Request to consume a share link.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConsumeRequest {
    /// The action being performed. Only `View` and `Download` consume.
    pub action: AccessAction,
    /// The document being accessed.
    pub document_id: String,
    /// Document name snapshot; falls back to the ID when absent.
    pub document_name: Option<String>,
    /// Share password, when the link is password-protected.
    pub password: Option<String>,
    /// View session duration, when an end-of-session signal exists.
    pub duration_ms: Option<i64>,
}

/// A share link together with its derived status and public URL.
///
/// Status is computed fresh from the link at read time, never stored.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShareLinkView {
    /// The underlying link record.
    #[serde(flatten)]
    pub link: ShareLink,
    /// Derived status at the time of the call.
    pub status: LinkStatus,
    /// Public share URL for the link's token.
    pub share_url: String,
}

/// Manages the share link lifecycle.
#[derive(Clone)]
pub struct ShareLinkService {
    /// Share link store.
    link_store: Arc<dyn ShareLinkStore>,
    /// Owner-action recording (share entries on create).
    logs: Arc<AccessLogService>,
    /// Suspicious-access classifier.
    auditor: Arc<AccessAuditor>,
    /// Password hasher for protected links.
    hasher: Arc<PasswordHasher>,
    /// Token issuer.
    issuer: TokenIssuer,
    /// Notifier boundary.
    notifier: Arc<dyn Notifier>,
    /// Sharing configuration.
    config: SharingConfig,
}

impl ShareLinkService {
    /// Creates a new share link service.
    pub fn new(
        link_store: Arc<dyn ShareLinkStore>,
        logs: Arc<AccessLogService>,
        auditor: Arc<AccessAuditor>,
        hasher: Arc<PasswordHasher>,
        notifier: Arc<dyn Notifier>,
        config: SharingConfig,
    ) -> Self {
        Self {
            link_store,
            logs,
            auditor,
            hasher,
            issuer: TokenIssuer::new(),
            notifier,
            config,
        }
    }

    /// Creates a new share link.
    pub async fn create(
        &self,
        owner: &OwnerContext,
        req: CreateShareLinkRequest,
    ) -> AppResult<ShareLinkView> {
        if req.document_ids.is_empty() {
            return Err(AppError::invalid_input(
                "At least one document must be selected",
            ));
        }
        if !req.recipient_email.validate_email() {
            return Err(AppError::invalid_input(
                "A valid recipient email is required",
            ));
        }
        if req.expires_in_seconds <= 0 {
            return Err(AppError::invalid_input("Expiry must be in the future"));
        }
        if let Some(max) = req.max_access_count {
            if max <= 0 {
                return Err(AppError::invalid_input("Access limit must be positive"));
            }
        }

        let password_hash = match req.password.as_deref() {
            Some(password) if !password.is_empty() => Some(self.hasher.hash(password)?),
            _ => None,
        };

        let now = Utc::now();
        let expires_at = now + Duration::seconds(req.expires_in_seconds);

        let mut attempts = 0u32;
        let link = loop {
            let new_link = NewShareLink {
                id: Uuid::new_v4(),
                token: self.issuer.issue(),
                document_ids: req.document_ids.clone(),
                owner_id: owner.owner_id,
                owner_email: owner.email.clone(),
                recipient_email: req.recipient_email.clone(),
                recipient_name: req.recipient_name.clone(),
                password_hash: password_hash.clone(),
                permission: req.permission,
                max_access_count: req.max_access_count,
                notify_on_access: req.notify_on_access,
                created_at: now,
                expires_at,
            };
            match self
                .with_store_retry(|| self.link_store.insert(new_link.clone()))
                .await
            {
                Ok(link) => break link,
                Err(e) if e.kind == ErrorKind::Conflict
                    && attempts < self.config.token_retry_limit =>
                {
                    attempts += 1;
                    warn!(attempts, "Share token collision, reissuing");
                }
                Err(e) => return Err(e),
            }
        };

        // The share itself is an owner action worth a log entry per
        // document. Creation already persisted, so a log failure here is
        // reported but not fatal.
        for document_id in &link.document_ids {
            if let Err(e) = self
                .logs
                .record_owner_action(owner, AccessAction::Share, document_id, document_id)
                .await
            {
                warn!(link_id = %link.id, error = %e, "Failed to record share action");
            }
        }

        info!(
            owner_id = %owner.owner_id,
            link_id = %link.id,
            documents = link.document_ids.len(),
            expires_at = %link.expires_at,
            "Share link created"
        );

        if link.notify_on_access {
            self.notify_async(
                link.recipient_email.clone(),
                ShareEvent::Created {
                    link_id: link.id,
                    document_ids: link.document_ids.clone(),
                    expires_at: link.expires_at,
                },
            );
        }

        Ok(self.view(link, now))
    }

    /// Validates a share token without consuming it.
    ///
    /// Read-only: a caller can check accessibility before committing to
    /// log the access.
    pub async fn validate(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> AppResult<ShareLinkView> {
        let now = Utc::now();
        let link = self.validate_inner(token, password, now).await?;
        Ok(self.view(link, now))
    }

    /// Consumes one access slot of a share link and records the access.
    ///
    /// Validation is re-run inside the store's atomic unit, closing the
    /// race between check and use: the counter increment and the log
    /// append happen together or not at all.
    pub async fn consume(
        &self,
        token: &str,
        accessor: &AccessorContext,
        req: ConsumeRequest,
    ) -> AppResult<AccessLogEntry> {
        if req.action == AccessAction::Share {
            return Err(AppError::invalid_input(
                "Only view and download actions consume a share link",
            ));
        }

        let now = Utc::now();
        let link = self.validate_inner(token, req.password.as_deref(), now).await?;

        if !link.document_ids.iter().any(|d| d == &req.document_id) {
            return Err(AppError::not_found(
                "Document is not covered by this share link",
            ));
        }
        if req.action == AccessAction::Download && !link.permission.allows_download() {
            return Err(AppError::forbidden(
                "This share link does not permit downloads",
            ));
        }

        let classification = self.auditor.classify(&link, accessor, now).await;

        let entry = NewAccessLogEntry {
            document_id: req.document_id.clone(),
            document_name: req
                .document_name
                .clone()
                .unwrap_or_else(|| req.document_id.clone()),
            action: req.action,
            actor: accessor.identity(),
            source_address: accessor.source_address.clone(),
            geo_location: accessor.geo_or_unknown(),
            device: accessor.device(),
            duration_ms: req.duration_ms,
            share_token: Some(token.to_string()),
            suspicious: classification.suspicious,
            suspicion_reason: classification.reason.clone(),
        };

        let (link, entry) = self
            .with_store_retry(|| {
                let entry = entry.clone();
                async move { self.link_store.consume(token, now, entry).await }
            })
            .await?;

        info!(
            link_id = %link.id,
            action = %entry.action,
            access_count = link.access_count,
            suspicious = entry.suspicious,
            "Share link consumed"
        );

        if link.notify_on_access {
            self.notify_async(
                link.owner_email.clone(),
                ShareEvent::Accessed {
                    link_id: link.id,
                    action: entry.action.to_string(),
                    access_count: link.access_count as u32,
                    source_address: entry.source_address.clone(),
                },
            );
        }
        if entry.suspicious {
            self.notify_async(
                link.owner_email.clone(),
                ShareEvent::SuspiciousAccess {
                    link_id: Some(link.id),
                    document_id: entry.document_id.clone(),
                    reason: classification.reason.unwrap_or_default(),
                },
            );
        }

        Ok(entry)
    }

    /// Revokes a share link. Idempotent: revoking an already-revoked link
    /// is a no-op success.
    pub async fn revoke(&self, owner_id: Uuid, link_id: Uuid) -> AppResult<()> {
        let link = self
            .with_store_retry(|| self.link_store.find_by_id(link_id))
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        if link.owner_id != owner_id {
            return Err(AppError::forbidden("Only the link owner can revoke it"));
        }

        let already_revoked = link.revoked_at.is_some();
        let now = Utc::now();
        self.with_store_retry(|| self.link_store.revoke(link_id, now))
            .await?;

        if !already_revoked {
            info!(owner_id = %owner_id, link_id = %link_id, "Share link revoked");
            self.notify_async(link.owner_email, ShareEvent::Revoked { link_id });
        }

        Ok(())
    }

    /// Lists an owner's share links, optionally filtered by status.
    ///
    /// Status is computed per item at call time.
    pub async fn list(
        &self,
        owner_id: Uuid,
        status: Option<LinkStatus>,
    ) -> AppResult<Vec<ShareLinkView>> {
        let now = Utc::now();
        let links = self
            .with_store_retry(|| self.link_store.list_by_owner(owner_id))
            .await?;

        Ok(links
            .into_iter()
            .map(|link| self.view(link, now))
            .filter(|view| status.is_none_or(|s| view.status == s))
            .collect())
    }

    /// Gets one of the owner's share links by ID.
    pub async fn get(&self, owner_id: Uuid, link_id: Uuid) -> AppResult<ShareLinkView> {
        let link = self
            .with_store_retry(|| self.link_store.find_by_id(link_id))
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        if link.owner_id != owner_id {
            return Err(AppError::forbidden("You can only view your own share links"));
        }

        Ok(self.view(link, Utc::now()))
    }

    /// Looks up the link, derives its status, and checks the password.
    async fn validate_inner(
        &self,
        token: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<ShareLink> {
        let link = self
            .with_store_retry(|| self.link_store.find_by_token(token))
            .await?
            .ok_or_else(|| AppError::not_found("Invalid share link"))?;

        link.ensure_active(now)?;

        if let Some(ref hash) = link.password_hash {
            let supplied = password.ok_or_else(|| {
                AppError::unauthorized("This share link requires a password")
            })?;
            if !self.hasher.verify(supplied, hash)? {
                return Err(AppError::unauthorized("Incorrect share password"));
            }
        }

        Ok(link)
    }

    fn view(&self, link: ShareLink, now: DateTime<Utc>) -> ShareLinkView {
        ShareLinkView {
            status: link.status(now),
            share_url: self.issuer.share_url(&self.config.base_url, &link.token),
            link,
        }
    }

    /// Retries an operation a bounded number of times on transient store
    /// failures, with linear backoff.
    async fn with_store_retry<T, F, Fut>(&self, op: F) -> AppResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Err(e) if e.is_retryable() && attempt < self.config.store_retry_limit => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Transient store failure, retrying");
                    sleep(StdDuration::from_millis(
                        self.config.store_retry_backoff_ms * u64::from(attempt),
                    ))
                    .await;
                }
                result => return result,
            }
        }
    }

    fn notify_async(&self, recipient: String, event: ShareEvent) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&recipient, event).await {
                warn!(recipient = %recipient, error = %e, "Notification delivery failed");
            }
        });
    }
}
