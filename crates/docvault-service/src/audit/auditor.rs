//! Suspicious-access classification.
//!
//! A deterministic, explainable rule set evaluated against the link's
//! recent history. Classification is advisory: it never blocks or retries
//! an access, and an internal failure degrades to "not suspicious" with a
//! warning instead of failing the caller.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use docvault_core::config::audit::AuditConfig;
use docvault_core::result::AppResult;
use docvault_entity::share::{LinkStatus, ShareLink};
use docvault_store::AccessLogStore;

use crate::context::AccessorContext;

/// Outcome of classifying one access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Whether the access warrants operator review.
    pub suspicious: bool,
    /// Human-readable reason for operator display.
    pub reason: Option<String>,
}

impl Classification {
    /// A non-suspicious classification.
    pub fn clear() -> Self {
        Self {
            suspicious: false,
            reason: None,
        }
    }

    /// A suspicious classification with its reason.
    pub fn flagged(reason: impl Into<String>) -> Self {
        Self {
            suspicious: true,
            reason: Some(reason.into()),
        }
    }
}

/// Classifies accesses against per-link history from the access log.
#[derive(Clone)]
pub struct AccessAuditor {
    /// Access log history source.
    log_store: Arc<dyn AccessLogStore>,
    /// Tunable heuristics thresholds.
    config: AuditConfig,
}

impl AccessAuditor {
    /// Creates a new auditor.
    pub fn new(log_store: Arc<dyn AccessLogStore>, config: AuditConfig) -> Self {
        Self { log_store, config }
    }

    /// Classify an access attempt against the link's recent history.
    ///
    /// Never fails: classifier errors are logged and default to a clear
    /// classification so the primary operation proceeds.
    pub async fn classify(
        &self,
        link: &ShareLink,
        accessor: &AccessorContext,
        now: DateTime<Utc>,
    ) -> Classification {
        match self.evaluate(link, accessor, now).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(
                    link_id = %link.id,
                    error = %e,
                    "Audit classification failed, defaulting to not suspicious"
                );
                Classification::clear()
            }
        }
    }

    async fn evaluate(
        &self,
        link: &ShareLink,
        accessor: &AccessorContext,
        now: DateTime<Utc>,
    ) -> AppResult<Classification> {
        // Consume validates before it classifies, so a non-active link
        // here means a caller bypassed validation. Flag it rather than
        // trusting the caller.
        let status = link.status(now);
        if status != LinkStatus::Active {
            return Ok(Classification::flagged(format!(
                "Access recorded after link became {status}"
            )));
        }

        let lookback = now - Duration::days(i64::from(self.config.lookback_days));
        let history = self
            .log_store
            .entries_for_token_since(&link.token, lookback)
            .await?;

        let window = Duration::seconds(self.config.burst_window_seconds as i64);
        let in_window = history
            .iter()
            .filter(|e| e.timestamp >= now - window)
            .count() as u32;
        // The access being classified counts towards the burst.
        if in_window + 1 > self.config.burst_threshold {
            return Ok(Classification::flagged(format!(
                "Burst detection: {} accesses of this link within {}s (threshold {})",
                in_window + 1,
                self.config.burst_window_seconds,
                self.config.burst_threshold,
            )));
        }

        let known: HashSet<&str> = history
            .iter()
            .map(|e| e.source_address.as_str())
            .collect();
        let identity = accessor.identity();
        let matches_recipient = identity.email.as_deref() == Some(link.recipient_email.as_str());
        // The first access establishes the baseline address set.
        if !known.is_empty()
            && !known.contains(accessor.source_address.as_str())
            && (identity.is_anonymous() || !matches_recipient)
        {
            let who = identity
                .email
                .clone()
                .unwrap_or_else(|| "an unidentified accessor".to_string());
            return Ok(Classification::flagged(format!(
                "Access from unfamiliar address {} by {} not matching the intended recipient",
                accessor.source_address, who,
            )));
        }

        Ok(Classification::clear())
    }
}
