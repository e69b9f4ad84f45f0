//! Access log recording for owner actions and operator queries.

use std::sync::Arc;

use tracing::info;

use docvault_core::error::AppError;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::access::{
    AccessAction, AccessLogEntry, AccessLogFilter, NewAccessLogEntry,
};
use docvault_store::AccessLogStore;

use crate::context::OwnerContext;
use crate::device;

/// Records direct owner actions and serves access log queries.
#[derive(Clone)]
pub struct AccessLogService {
    /// Access log store.
    log_store: Arc<dyn AccessLogStore>,
}

impl AccessLogService {
    /// Creates a new access log service.
    pub fn new(log_store: Arc<dyn AccessLogStore>) -> Self {
        Self { log_store }
    }

    /// Records a direct owner action (no share token involved).
    ///
    /// The actor is a verified principal from the authentication provider,
    /// so owner actions are never flagged: the unfamiliar-origin rule
    /// requires an unresolved or mismatched identity, and the remaining
    /// rules are token-scoped.
    pub async fn record_owner_action(
        &self,
        owner: &OwnerContext,
        action: AccessAction,
        document_id: &str,
        document_name: &str,
    ) -> Result<AccessLogEntry, AppError> {
        let entry = self
            .log_store
            .append(NewAccessLogEntry {
                document_id: document_id.to_string(),
                document_name: document_name.to_string(),
                action,
                actor: owner.identity(),
                source_address: owner.source_address.clone(),
                geo_location: "Unknown".to_string(),
                device: device::describe(owner.user_agent.as_deref()),
                duration_ms: None,
                share_token: None,
                suspicious: false,
                suspicion_reason: None,
            })
            .await?;

        info!(
            owner_id = %owner.owner_id,
            document_id = %document_id,
            action = %action,
            "Owner action recorded"
        );

        Ok(entry)
    }

    /// Queries the access log with the given filter, newest first.
    pub async fn query(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<AccessLogEntry>, AppError> {
        self.log_store.query(filter, page).await
    }
}
