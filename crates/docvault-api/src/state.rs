//! Application state shared across all handlers.

use std::sync::Arc;

use docvault_core::config::AppConfig;
use docvault_service::{AccessLogService, ShareLinkService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Share link lifecycle service.
    pub share_service: Arc<ShareLinkService>,
    /// Access log recording and query service.
    pub log_service: Arc<AccessLogService>,
}
