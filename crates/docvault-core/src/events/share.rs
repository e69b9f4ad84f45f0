//! Share-link domain events.
//!
//! These are the payloads handed to the notifier. Delivery is
//! fire-and-forget; no component waits on or reacts to the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to share-link lifecycle and access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A share link was created.
    Created {
        /// The share link ID.
        link_id: Uuid,
        /// Documents covered by the link.
        document_ids: Vec<String>,
        /// When the link expires.
        expires_at: DateTime<Utc>,
    },
    /// A share link was consumed (viewed or downloaded).
    Accessed {
        /// The share link ID.
        link_id: Uuid,
        /// The action performed (`"view"` or `"download"`).
        action: String,
        /// Access count after this consumption.
        access_count: u32,
        /// The accessor's source address.
        source_address: String,
    },
    /// A share link was revoked by its owner.
    Revoked {
        /// The share link ID.
        link_id: Uuid,
    },
    /// An access was flagged as suspicious by the auditor.
    SuspiciousAccess {
        /// The share link ID, when the access came through a link.
        link_id: Option<Uuid>,
        /// The document that was accessed.
        document_id: String,
        /// Human-readable classification reason.
        reason: String,
    },
}
