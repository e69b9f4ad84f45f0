//! Share link entity model.
//!
//! A share link is a token-bearing, time- and count-bounded capability
//! granting access to a fixed set of documents. Its status is never
//! stored: it is derived from the revocation flag, expiry, and counters
//! every time it is read, so stored state can never disagree with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use docvault_core::error::AppError;

/// Permission level granted by a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_permission", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    /// Recipients may view the documents only.
    View,
    /// Recipients may view and download the documents.
    ViewAndDownload,
}

impl SharePermission {
    /// Whether this permission level covers downloads.
    pub fn allows_download(&self) -> bool {
        matches!(self, Self::ViewAndDownload)
    }
}

/// Lifecycle state of a share link, derived at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// The link can still be consumed.
    Active,
    /// The expiry time has passed.
    Expired,
    /// The owner explicitly revoked the link.
    Revoked,
    /// The access budget is used up.
    Exhausted,
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

impl std::str::FromStr for LinkStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "revoked" => Ok(Self::Revoked),
            "exhausted" => Ok(Self::Exhausted),
            other => Err(AppError::invalid_input(format!(
                "Invalid link status: {other}"
            ))),
        }
    }
}

/// A share link granting bounded access to a set of documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareLink {
    /// Unique share link identifier.
    pub id: Uuid,
    /// Unguessable token used in the public share URL.
    pub token: String,
    /// Documents covered by this link. Non-empty, immutable after creation.
    pub document_ids: Vec<String>,
    /// Owner who created the link.
    pub owner_id: Uuid,
    /// Owner email snapshot, used for access notifications.
    pub owner_email: String,
    /// Intended recipient's email (informational).
    pub recipient_email: String,
    /// Intended recipient's display name (informational).
    pub recipient_name: Option<String>,
    /// Argon2id hash of the share password, if password-protected.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Permission level granted.
    pub permission: SharePermission,
    /// Maximum number of consumptions (None = unlimited).
    pub max_access_count: Option<i32>,
    /// Consumptions so far. Monotonically increasing.
    pub access_count: i32,
    /// Whether the owner is notified when the link is accessed.
    pub notify_on_access: bool,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link expires. Strictly after `created_at`.
    pub expires_at: DateTime<Utc>,
    /// When the link was revoked, if it was. Authoritative revocation flag.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ShareLink {
    /// Derive the link's status at `now`.
    ///
    /// Pure function of the revocation flag, expiry, and counters.
    /// Precedence when several terminal conditions hold: revoked wins over
    /// expired, which wins over exhausted.
    pub fn status(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.revoked_at.is_some() {
            return LinkStatus::Revoked;
        }
        if now > self.expires_at {
            return LinkStatus::Expired;
        }
        if let Some(max) = self.max_access_count {
            if self.access_count >= max {
                return LinkStatus::Exhausted;
            }
        }
        LinkStatus::Active
    }

    /// Return an error matching the link's terminal state, or `Ok` if the
    /// link is still consumable at `now`.
    pub fn ensure_active(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        match self.status(now) {
            LinkStatus::Active => Ok(()),
            LinkStatus::Expired => Err(AppError::expired("Share link has expired")),
            LinkStatus::Revoked => Err(AppError::revoked("Share link has been revoked")),
            LinkStatus::Exhausted => Err(AppError::exhausted(
                "Share link has reached its access limit",
            )),
        }
    }
}

/// Data required to persist a new share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareLink {
    /// Pre-assigned link ID.
    pub id: Uuid,
    /// Freshly issued token.
    pub token: String,
    /// Documents covered by the link.
    pub document_ids: Vec<String>,
    /// Owner creating the link.
    pub owner_id: Uuid,
    /// Owner email snapshot.
    pub owner_email: String,
    /// Recipient email.
    pub recipient_email: String,
    /// Recipient display name.
    pub recipient_name: Option<String>,
    /// Password hash (never the plaintext).
    pub password_hash: Option<String>,
    /// Permission level.
    pub permission: SharePermission,
    /// Access ceiling (None = unlimited).
    pub max_access_count: Option<i32>,
    /// Notify the owner on access.
    pub notify_on_access: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl NewShareLink {
    /// Materialize the persisted form of this link with zeroed counters.
    pub fn into_link(self) -> ShareLink {
        ShareLink {
            id: self.id,
            token: self.token,
            document_ids: self.document_ids,
            owner_id: self.owner_id,
            owner_email: self.owner_email,
            recipient_email: self.recipient_email,
            recipient_name: self.recipient_name,
            password_hash: self.password_hash,
            permission: self.permission,
            max_access_count: self.max_access_count,
            access_count: 0,
            notify_on_access: self.notify_on_access,
            created_at: self.created_at,
            expires_at: self.expires_at,
            revoked_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_link(now: DateTime<Utc>) -> ShareLink {
        ShareLink {
            id: Uuid::new_v4(),
            token: "tok".to_string(),
            document_ids: vec!["doc-1".to_string()],
            owner_id: Uuid::new_v4(),
            owner_email: "owner@clinic.example".to_string(),
            recipient_email: "dr.smith@hospital.example".to_string(),
            recipient_name: None,
            password_hash: None,
            permission: SharePermission::View,
            max_access_count: Some(2),
            access_count: 0,
            notify_on_access: false,
            created_at: now,
            expires_at: now + Duration::days(7),
            revoked_at: None,
        }
    }

    #[test]
    fn test_status_active_when_fresh() {
        let now = Utc::now();
        assert_eq!(sample_link(now).status(now), LinkStatus::Active);
    }

    #[test]
    fn test_status_expired_strictly_after_expiry() {
        let now = Utc::now();
        let link = sample_link(now);
        assert_eq!(link.status(link.expires_at), LinkStatus::Active);
        assert_eq!(
            link.status(link.expires_at + Duration::seconds(1)),
            LinkStatus::Expired
        );
    }

    #[test]
    fn test_status_exhausted_at_ceiling() {
        let now = Utc::now();
        let mut link = sample_link(now);
        link.access_count = 2;
        assert_eq!(link.status(now), LinkStatus::Exhausted);
    }

    #[test]
    fn test_unlimited_link_never_exhausts() {
        let now = Utc::now();
        let mut link = sample_link(now);
        link.max_access_count = None;
        link.access_count = 10_000;
        assert_eq!(link.status(now), LinkStatus::Active);
    }

    #[test]
    fn test_revoked_wins_over_expired_and_exhausted() {
        let now = Utc::now();
        let mut link = sample_link(now);
        link.access_count = 5;
        link.revoked_at = Some(now);
        assert_eq!(
            link.status(now + Duration::days(30)),
            LinkStatus::Revoked
        );
    }

    #[test]
    fn test_ensure_active_maps_to_error_kinds() {
        use docvault_core::error::ErrorKind;
        let now = Utc::now();
        let mut link = sample_link(now);
        assert!(link.ensure_active(now).is_ok());

        link.access_count = 2;
        let err = link.ensure_active(now).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Exhausted);

        let err = link.ensure_active(now + Duration::days(8)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Expired);
    }
}
