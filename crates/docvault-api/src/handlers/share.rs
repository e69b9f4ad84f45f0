//! Owner-facing share link management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_entity::share::LinkStatus;
use docvault_service::ShareLinkView;

use crate::dto::request::CreateShareLinkBody;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthOwner;
use crate::state::AppState;

/// Query parameters for `GET /api/share-links`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListShareLinksQuery {
    /// Only return links whose derived status matches.
    pub status: Option<LinkStatus>,
}

/// POST /api/share-links
pub async fn create_share_link(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(body): Json<CreateShareLinkBody>,
) -> Result<Json<ApiResponse<ShareLinkView>>, ApiError> {
    let view = state
        .share_service
        .create(&owner.0, body.into_request())
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/share-links
pub async fn list_share_links(
    State(state): State<AppState>,
    owner: AuthOwner,
    Query(query): Query<ListShareLinksQuery>,
) -> Result<Json<ApiResponse<Vec<ShareLinkView>>>, ApiError> {
    let views = state
        .share_service
        .list(owner.owner_id, query.status)
        .await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// GET /api/share-links/{id}
pub async fn get_share_link(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShareLinkView>>, ApiError> {
    let view = state.share_service.get(owner.owner_id, id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// DELETE /api/share-links/{id}
pub async fn revoke_share_link(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.share_service.revoke(owner.owner_id, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Share link revoked".to_string(),
    })))
}
