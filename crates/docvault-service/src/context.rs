//! Request contexts: the verified owner principal and the (possibly
//! anonymous) accessor of a share link.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_entity::access::ActorIdentity;

use crate::device;

/// Context for an owner-initiated call.
///
/// The identity is supplied, already verified, by the upstream
/// authentication provider; the core performs no credential checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerContext {
    /// The verified owner's ID.
    pub owner_id: Uuid,
    /// The verified owner's email.
    pub email: String,
    /// The verified owner's display name.
    pub name: String,
    /// Network origin of the request.
    pub source_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl OwnerContext {
    /// The owner as an access log actor.
    pub fn identity(&self) -> ActorIdentity {
        ActorIdentity {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
        }
    }
}

/// Context for a token-based access attempt.
///
/// Identity fields are whatever the accessor volunteered; they may be
/// absent entirely for anonymous access through a public token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessorContext {
    /// Accessor display name, if provided.
    pub name: Option<String>,
    /// Accessor email, if provided.
    pub email: Option<String>,
    /// Network origin of the request.
    pub source_address: String,
    /// Best-effort resolved location, if the edge provided one.
    pub geo_location: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl AccessorContext {
    /// The accessor as an access log actor.
    pub fn identity(&self) -> ActorIdentity {
        ActorIdentity {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Resolved location or `"Unknown"`.
    pub fn geo_or_unknown(&self) -> String {
        self.geo_location
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Coarse device descriptor derived from the User-Agent.
    pub fn device(&self) -> String {
        device::describe(self.user_agent.as_deref())
    }
}
