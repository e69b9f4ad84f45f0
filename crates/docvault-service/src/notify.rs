//! Notifier boundary.
//!
//! Email delivery is an external collaborator; DocVault only hands a
//! recipient and a [`ShareEvent`] across this trait. Invocations are
//! fire-and-forget: the caller spawns them and never lets a delivery
//! failure affect the primary operation.

use async_trait::async_trait;
use tracing::info;

use docvault_core::error::AppError;
use docvault_core::events::ShareEvent;

/// Outbound notification boundary.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver `event` to `recipient_email`. Best-effort.
    async fn notify(&self, recipient_email: &str, event: ShareEvent) -> Result<(), AppError>;
}

/// Notifier that records deliveries in the application log.
///
/// Stands in wherever no real delivery backend is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a new log-only notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient_email: &str, event: ShareEvent) -> Result<(), AppError> {
        info!(recipient = %recipient_email, event = ?event, "Notification dispatched");
        Ok(())
    }
}
