//! `AuthOwner` extractor. The upstream authentication provider fronts
//! this service and forwards the verified principal as trusted headers;
//! no credential checking happens here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_service::OwnerContext;

use crate::error::ApiError;
use crate::extractors::client::{forwarded_source, header_string};
use crate::state::AppState;

/// Extracted owner principal available in handlers.
#[derive(Debug, Clone)]
pub struct AuthOwner(pub OwnerContext);

impl std::ops::Deref for AuthOwner {
    type Target = OwnerContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let owner_id = header_string(parts, "x-auth-user-id")
            .ok_or_else(|| AppError::unauthorized("Missing x-auth-user-id header"))?
            .parse::<Uuid>()
            .map_err(|_| AppError::unauthorized("Invalid x-auth-user-id header"))?;

        let email = header_string(parts, "x-auth-email")
            .ok_or_else(|| AppError::unauthorized("Missing x-auth-email header"))?;

        // The display name is informational; fall back to the email.
        let name = header_string(parts, "x-auth-name").unwrap_or_else(|| email.clone());

        Ok(AuthOwner(OwnerContext {
            owner_id,
            email,
            name,
            source_address: forwarded_source(parts),
            user_agent: header_string(parts, "user-agent"),
        }))
    }
}
