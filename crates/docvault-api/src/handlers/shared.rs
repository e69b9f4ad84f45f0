//! Public token access handlers. No owner principal here; the caller
//! holds only the share token (and optionally the share password).

use axum::Json;
use axum::extract::{Path, State};

use docvault_entity::access::AccessLogEntry;
use docvault_service::{AccessorContext, ShareLinkView};

use crate::dto::request::{ConsumeShareBody, ValidateShareBody};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ClientInfo;
use crate::state::AppState;

/// GET /api/shared/{token}
pub async fn validate_shared(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<ShareLinkView>>, ApiError> {
    let view = state.share_service.validate(&token, None).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/shared/{token}/validate
pub async fn validate_shared_with_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ValidateShareBody>,
) -> Result<Json<ApiResponse<ShareLinkView>>, ApiError> {
    let view = state
        .share_service
        .validate(&token, body.password.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/shared/{token}/consume
pub async fn consume_shared(
    State(state): State<AppState>,
    Path(token): Path<String>,
    client: ClientInfo,
    Json(body): Json<ConsumeShareBody>,
) -> Result<Json<ApiResponse<AccessLogEntry>>, ApiError> {
    let accessor = AccessorContext {
        name: body.accessor_name.clone(),
        email: body.accessor_email.clone(),
        source_address: client.source_address,
        geo_location: client.geo_location,
        user_agent: client.user_agent,
    };

    let entry = state
        .share_service
        .consume(&token, &accessor, body.into_request())
        .await?;
    Ok(Json(ApiResponse::ok(entry)))
}
