//! PostgreSQL share link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_entity::access::{AccessLogEntry, NewAccessLogEntry};
use docvault_entity::share::{NewShareLink, ShareLink};

use crate::ShareLinkStore;

use super::map_sqlx_err;

/// Share link store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgShareLinkStore {
    pool: PgPool,
}

impl PgShareLinkStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareLinkStore for PgShareLinkStore {
    async fn insert(&self, link: NewShareLink) -> AppResult<ShareLink> {
        sqlx::query_as::<_, ShareLink>(
            "INSERT INTO share_links (id, token, document_ids, owner_id, owner_email, \
             recipient_email, recipient_name, password_hash, permission, max_access_count, \
             access_count, notify_on_access, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, $12, $13) RETURNING *",
        )
        .bind(link.id)
        .bind(&link.token)
        .bind(&link.document_ids)
        .bind(link.owner_id)
        .bind(&link.owner_email)
        .bind(&link.recipient_email)
        .bind(&link.recipient_name)
        .bind(&link.password_hash)
        .bind(link.permission)
        .bind(link.max_access_count)
        .bind(link.notify_on_access)
        .bind(link.created_at)
        .bind(link.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("Failed to insert share link", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("Failed to find share link", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("Failed to find share link by token", e))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ShareLink>> {
        sqlx::query_as::<_, ShareLink>(
            "SELECT * FROM share_links WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("Failed to list share links", e))
    }

    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<ShareLink> {
        // COALESCE keeps the original revocation time on repeat calls.
        sqlx::query_as::<_, ShareLink>(
            "UPDATE share_links SET revoked_at = COALESCE(revoked_at, $2) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("Failed to revoke share link", e))?
        .ok_or_else(|| AppError::not_found("Share link not found"))
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
        entry: NewAccessLogEntry,
    ) -> AppResult<(ShareLink, AccessLogEntry)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_err("Failed to begin consume transaction", e))?;

        // Row lock closes the check-then-act race: concurrent consumers of
        // the same link serialize here.
        let link = sqlx::query_as::<_, ShareLink>(
            "SELECT * FROM share_links WHERE token = $1 FOR UPDATE",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_err("Failed to lock share link", e))?
        .ok_or_else(|| AppError::not_found("Share link not found"))?;

        // Dropping the transaction on error rolls back without writes.
        link.ensure_active(now)?;

        let link = sqlx::query_as::<_, ShareLink>(
            "UPDATE share_links SET access_count = access_count + 1 \
             WHERE id = $1 RETURNING *",
        )
        .bind(link.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_err("Failed to increment access count", e))?;

        let entry = sqlx::query_as::<_, AccessLogEntry>(
            "INSERT INTO access_log (id, document_id, document_name, action, actor_name, \
             actor_email, source_address, geo_location, device, timestamp, duration_ms, \
             share_token, suspicious, suspicion_reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&entry.document_id)
        .bind(&entry.document_name)
        .bind(entry.action)
        .bind(&entry.actor.name)
        .bind(&entry.actor.email)
        .bind(&entry.source_address)
        .bind(&entry.geo_location)
        .bind(&entry.device)
        .bind(now)
        .bind(entry.duration_ms)
        .bind(&entry.share_token)
        .bind(entry.suspicious)
        .bind(&entry.suspicion_reason)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_err("Failed to append access log entry", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_err("Failed to commit consume transaction", e))?;

        Ok((link, entry))
    }
}
