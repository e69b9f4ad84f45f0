//! Access log entry entity model.
//!
//! Entries are append-only: written once when an access is recorded and
//! never mutated or deleted afterwards. Document name is a snapshot so
//! history survives later renames or deletions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use docvault_core::error::AppError;

/// The kind of access that was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    /// A document was viewed.
    View,
    /// A document was downloaded.
    Download,
    /// A document was shared (owner action).
    Share,
}

impl std::str::FromStr for AccessAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            "share" => Ok(Self::Share),
            other => Err(AppError::invalid_input(format!(
                "Invalid access action: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for AccessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Download => write!(f, "download"),
            Self::Share => write!(f, "share"),
        }
    }
}

/// Identity of the accessor as far as it is known.
///
/// Both fields are `None` for anonymous access through a public token
/// without any identity binding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ActorIdentity {
    /// Accessor display name, if known.
    #[sqlx(rename = "actor_name")]
    pub name: Option<String>,
    /// Accessor email, if known.
    #[sqlx(rename = "actor_email")]
    pub email: Option<String>,
}

impl ActorIdentity {
    /// An accessor with no identity binding.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether no identity information is available.
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// An immutable access log entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessLogEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The document that was accessed.
    pub document_id: String,
    /// Document name snapshot at access time.
    pub document_name: String,
    /// The action performed.
    pub action: AccessAction,
    /// Who accessed the document, as far as known.
    #[sqlx(flatten)]
    pub actor: ActorIdentity,
    /// Network origin of the request.
    pub source_address: String,
    /// Best-effort resolved location, `"Unknown"` when unresolved.
    pub geo_location: String,
    /// Coarse device classification (platform + agent family).
    pub device: String,
    /// When the access was recorded.
    pub timestamp: DateTime<Utc>,
    /// View session duration in milliseconds, when an end-of-session
    /// signal existed.
    pub duration_ms: Option<i64>,
    /// The share token used, `None` for direct owner actions.
    pub share_token: Option<String>,
    /// Whether the auditor flagged this access. Assigned once at write time.
    pub suspicious: bool,
    /// Human-readable classification reason for operator display.
    pub suspicion_reason: Option<String>,
}

/// Data required to append a new access log entry.
///
/// The store assigns `id` and `timestamp` at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccessLogEntry {
    /// The document that was accessed.
    pub document_id: String,
    /// Document name snapshot.
    pub document_name: String,
    /// The action performed.
    pub action: AccessAction,
    /// Who accessed the document.
    pub actor: ActorIdentity,
    /// Network origin of the request.
    pub source_address: String,
    /// Best-effort resolved location.
    pub geo_location: String,
    /// Coarse device classification.
    pub device: String,
    /// View session duration, if known at record time.
    pub duration_ms: Option<i64>,
    /// The share token used, `None` for owner actions.
    pub share_token: Option<String>,
    /// Auditor classification.
    pub suspicious: bool,
    /// Auditor classification reason.
    pub suspicion_reason: Option<String>,
}

impl NewAccessLogEntry {
    /// Materialize the persisted entry with a fresh id and timestamp.
    pub fn into_entry(self, id: Uuid, timestamp: DateTime<Utc>) -> AccessLogEntry {
        AccessLogEntry {
            id,
            document_id: self.document_id,
            document_name: self.document_name,
            action: self.action,
            actor: self.actor,
            source_address: self.source_address,
            geo_location: self.geo_location,
            device: self.device,
            timestamp,
            duration_ms: self.duration_ms,
            share_token: self.share_token,
            suspicious: self.suspicious,
            suspicion_reason: self.suspicion_reason,
        }
    }
}
