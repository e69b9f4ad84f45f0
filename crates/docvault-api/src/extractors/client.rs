//! Client network metadata extractor for public token access.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Network-level facts about the caller, taken from edge headers.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Network origin, from `x-forwarded-for` when present.
    pub source_address: String,
    /// Location resolved by the edge, when it provides one.
    pub geo_location: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            source_address: forwarded_source(parts),
            geo_location: header_string(parts, "x-geo-location"),
            user_agent: header_string(parts, "user-agent"),
        })
    }
}

/// Reads a header as an owned string, if present and valid UTF-8.
pub(crate) fn header_string(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// The client address per `x-forwarded-for` (first hop), or `"unknown"`.
pub(crate) fn forwarded_source(parts: &Parts) -> String {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
