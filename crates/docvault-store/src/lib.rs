//! # docvault-store
//!
//! Persistence contracts for DocVault and their backings.
//!
//! Business logic depends only on the [`ShareLinkStore`] and
//! [`AccessLogStore`] traits; the backing is chosen at startup. Two
//! backings are provided: [`memory::MemoryStore`] for single-node use and
//! tests, and the PostgreSQL stores in [`postgres`] for production.
//!
//! The one compound operation is [`ShareLinkStore::consume`]: deriving the
//! link's status, incrementing its counter, and appending the access log
//! entry happen as a single atomic unit, so no reader can ever observe a
//! log entry without the matching counter update or vice versa.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::access::{AccessLogEntry, AccessLogFilter, NewAccessLogEntry};
use docvault_entity::share::{NewShareLink, ShareLink};

/// Persistence contract for share links.
#[async_trait]
pub trait ShareLinkStore: Send + Sync + 'static {
    /// Insert a new share link.
    ///
    /// Fails with `Conflict` when the token is already taken; the service
    /// layer retries with a fresh token.
    async fn insert(&self, link: NewShareLink) -> AppResult<ShareLink>;

    /// Find a link by its ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareLink>>;

    /// Find a link by its token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>>;

    /// List all links created by an owner, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ShareLink>>;

    /// Set the revocation flag on a link.
    ///
    /// Idempotent: revoking an already-revoked link keeps the original
    /// revocation time and succeeds. Fails with `NotFound` for unknown IDs.
    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<ShareLink>;

    /// Atomically consume one access slot of the link identified by `token`
    /// and append the given log entry.
    ///
    /// Re-derives the link status at `now` inside the atomic section and
    /// fails with `NotFound` / `Expired` / `Revoked` / `Exhausted` without
    /// writing anything when the link is not consumable. At most one
    /// concurrent caller can take the last remaining slot; all others
    /// observe `Exhausted`.
    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
        entry: NewAccessLogEntry,
    ) -> AppResult<(ShareLink, AccessLogEntry)>;
}

/// Persistence contract for the append-only access log.
#[async_trait]
pub trait AccessLogStore: Send + Sync + 'static {
    /// Append a new entry. Entries are never updated or deleted.
    async fn append(&self, entry: NewAccessLogEntry) -> AppResult<AccessLogEntry>;

    /// Query entries matching the filter, newest first, paginated.
    async fn query(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLogEntry>>;

    /// All entries recorded through `token` at or after `since`,
    /// used by the auditor to build per-link history.
    async fn entries_for_token_since(
        &self,
        token: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AccessLogEntry>>;
}
