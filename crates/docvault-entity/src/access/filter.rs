//! Access log query filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{AccessAction, AccessLogEntry};

/// Filter for access log queries. All fields are optional and combinable;
/// an empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessLogFilter {
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

impl AccessLogFilter {
    /// Whether an entry satisfies every set condition.
    pub fn matches(&self, entry: &AccessLogEntry) -> bool {
        if let Some(ref doc) = self.document_id {
            if entry.document_id != *doc {
                return false;
            }
        }
        if let Some(ref email) = self.actor_email {
            if entry.actor.email.as_deref() != Some(email.as_str()) {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(suspicious) = self.suspicious {
            if entry.suspicious != suspicious {
                return false;
            }
        }
        if let Some(ref token) = self.share_token {
            if entry.share_token.as_deref() != Some(token.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.timestamp > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::model::{ActorIdentity, NewAccessLogEntry};
    use uuid::Uuid;

    fn entry(action: AccessAction, suspicious: bool) -> AccessLogEntry {
        NewAccessLogEntry {
            document_id: "doc-1".to_string(),
            document_name: "Blood Test Results".to_string(),
            action,
            actor: ActorIdentity::anonymous(),
            source_address: "192.168.1.100".to_string(),
            geo_location: "Unknown".to_string(),
            device: "Desktop - Chrome".to_string(),
            duration_ms: None,
            share_token: Some("tok".to_string()),
            suspicious,
            suspicion_reason: None,
        }
        .into_entry(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(AccessLogFilter::default().matches(&entry(AccessAction::View, false)));
    }

    #[test]
    fn test_filters_combine_conjunctively() {
        let filter = AccessLogFilter {
            action: Some(AccessAction::Download),
            suspicious: Some(true),
            ..Default::default()
        };
        assert!(filter.matches(&entry(AccessAction::Download, true)));
        assert!(!filter.matches(&entry(AccessAction::Download, false)));
        assert!(!filter.matches(&entry(AccessAction::View, true)));
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let e = entry(AccessAction::View, false);
        let filter = AccessLogFilter {
            from: Some(e.timestamp),
            to: Some(e.timestamp),
            ..Default::default()
        };
        assert!(filter.matches(&e));
    }
}
