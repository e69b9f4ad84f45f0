//! PostgreSQL access log store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::access::{AccessLogEntry, AccessLogFilter, NewAccessLogEntry};

use crate::AccessLogStore;

use super::map_sqlx_err;

/// Access log store backed by PostgreSQL. Append-only by contract; no
/// update or delete statements exist here.
#[derive(Debug, Clone)]
pub struct PgAccessLogStore {
    pool: PgPool,
}

impl PgAccessLogStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogStore for PgAccessLogStore {
    async fn append(&self, entry: NewAccessLogEntry) -> AppResult<AccessLogEntry> {
        sqlx::query_as::<_, AccessLogEntry>(
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
        .bind(Utc::now())
        .bind(entry.duration_ms)
        .bind(&entry.share_token)
        .bind(entry.suspicious)
        .bind(&entry.suspicion_reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("Failed to append access log entry", e))
    }

    async fn query(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLogEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.document_id.is_some() {
            conditions.push(format!("document_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.actor_email.is_some() {
            conditions.push(format!("actor_email = ${param_idx}"));
            param_idx += 1;
        }
        if filter.action.is_some() {
            conditions.push(format!("action = ${param_idx}"));
            param_idx += 1;
        }
        if filter.suspicious.is_some() {
            conditions.push(format!("suspicious = ${param_idx}"));
            param_idx += 1;
        }
        if filter.share_token.is_some() {
            conditions.push(format!("share_token = ${param_idx}"));
            param_idx += 1;
        }
        if filter.from.is_some() {
            conditions.push(format!("timestamp >= ${param_idx}"));
            param_idx += 1;
        }
        if filter.to.is_some() {
            conditions.push(format!("timestamp <= ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM access_log {where_clause}");
        let select_sql = format!(
            "SELECT * FROM access_log {where_clause} ORDER BY timestamp DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AccessLogEntry>(&select_sql);

        if let Some(ref doc) = filter.document_id {
            count_query = count_query.bind(doc.clone());
            select_query = select_query.bind(doc.clone());
        }
        if let Some(ref email) = filter.actor_email {
            count_query = count_query.bind(email.clone());
            select_query = select_query.bind(email.clone());
        }
        if let Some(action) = filter.action {
            count_query = count_query.bind(action);
            select_query = select_query.bind(action);
        }
        if let Some(suspicious) = filter.suspicious {
            count_query = count_query.bind(suspicious);
            select_query = select_query.bind(suspicious);
        }
        if let Some(ref token) = filter.share_token {
            count_query = count_query.bind(token.clone());
            select_query = select_query.bind(token.clone());
        }
        if let Some(from) = filter.from {
            count_query = count_query.bind(from);
            select_query = select_query.bind(from);
        }
        if let Some(to) = filter.to {
            count_query = count_query.bind(to);
            select_query = select_query.bind(to);
        }

        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("Failed to count access log entries", e))?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("Failed to query access log", e))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn entries_for_token_since(
        &self,
        token: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AccessLogEntry>> {
        sqlx::query_as::<_, AccessLogEntry>(
            "SELECT * FROM access_log WHERE share_token = $1 AND timestamp >= $2",
        )
        .bind(token)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("Failed to load token history", e))
    }
}
