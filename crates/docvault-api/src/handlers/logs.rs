//! Access log query handlers.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::pagination::PageResponse;
use docvault_entity::access::{AccessAction, AccessLogEntry, AccessLogFilter};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthOwner, PaginationParams};
use crate::state::AppState;

/// Query parameters for `GET /api/access-logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogQueryParams {
    /// Match entries for this document.
    pub document_id: Option<String>,
    /// Match entries whose actor email equals this value.
    pub actor_email: Option<String>,
    /// Match entries with this action.
    pub action: Option<AccessAction>,
    /// Match entries with this suspicion flag.
    pub suspicious: Option<bool>,
    /// Match entries recorded through this share token.
    pub share_token: Option<String>,
    /// Match entries at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Match entries at or before this time.
    pub to: Option<DateTime<Utc>>,
}

impl AccessLogQueryParams {
    fn into_filter(self) -> AccessLogFilter {
        AccessLogFilter {
            document_id: self.document_id,
            actor_email: self.actor_email,
            action: self.action,
            suspicious: self.suspicious,
            share_token: self.share_token,
            from: self.from,
            to: self.to,
        }
    }
}

/// GET /api/access-logs
pub async fn query_access_logs(
    State(state): State<AppState>,
    _owner: AuthOwner,
    Query(params): Query<AccessLogQueryParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AccessLogEntry>>>, ApiError> {
    let page = state
        .log_service
        .query(&params.into_filter(), &pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
