//! Request body DTOs.

use serde::{Deserialize, Serialize};

use docvault_entity::access::AccessAction;
use docvault_entity::share::SharePermission;
use docvault_service::{ConsumeRequest, CreateShareLinkRequest};

/// Body for `POST /api/share-links`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareLinkBody {
    /// Documents to cover.
    pub document_ids: Vec<String>,
    /// Recipient email address.
    pub recipient_email: String,
    /// Recipient display name.
    pub recipient_name: Option<String>,
    /// Link lifetime from now, in seconds.
    pub expires_in_seconds: i64,
    /// Access ceiling; omit for unlimited.
    pub max_access_count: Option<i32>,
    /// Share password; omit for an open link.
    pub password: Option<String>,
    /// Permission level.
    pub permission: SharePermission,
    /// Notify the owner on each access.
    #[serde(default)]
    pub notify_on_access: bool,
}

impl CreateShareLinkBody {
    /// Converts to the service-layer request.
    pub fn into_request(self) -> CreateShareLinkRequest {
        CreateShareLinkRequest {
            document_ids: self.document_ids,
            recipient_email: self.recipient_email,
            recipient_name: self.recipient_name,
            expires_in_seconds: self.expires_in_seconds,
            max_access_count: self.max_access_count,
            password: self.password,
            permission: self.permission,
            notify_on_access: self.notify_on_access,
        }
    }
}

/// Body for `POST /api/shared/{token}/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateShareBody {
    /// Share password for password-protected links.
    pub password: Option<String>,
}

/// Body for `POST /api/shared/{token}/consume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumeShareBody {
    /// The action being performed.
    pub action: AccessAction,
    /// The document being accessed.
    pub document_id: String,
    /// Document name snapshot.
    pub document_name: Option<String>,
    /// Share password for password-protected links.
    pub password: Option<String>,
    /// View session duration in milliseconds, when known.
    pub duration_ms: Option<i64>,
    /// Accessor display name, if volunteered.
    pub accessor_name: Option<String>,
    /// Accessor email, if volunteered.
    pub accessor_email: Option<String>,
}

impl ConsumeShareBody {
    /// Converts to the service-layer request, dropping the accessor
    /// identity fields (those feed the `AccessorContext`).
    pub fn into_request(self) -> ConsumeRequest {
        ConsumeRequest {
            action: self.action,
            document_id: self.document_id,
            document_name: self.document_name,
            password: self.password,
            duration_ms: self.duration_ms,
        }
    }
}
