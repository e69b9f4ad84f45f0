//! Access auditing heuristics configuration.
//!
//! Thresholds are tunable rather than fixed constants; the defaults are
//! intentionally conservative (small burst counts, short windows).

use serde::{Deserialize, Serialize};

/// Settings for the suspicious-access classification heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Accesses of the same token within the burst window beyond this
    /// count are flagged as a burst.
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: u32,
    /// Sliding window for burst detection, in seconds.
    #[serde(default = "default_burst_window_seconds")]
    pub burst_window_seconds: u64,
    /// How far back to look when building the set of familiar source
    /// addresses for a link, in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            burst_threshold: default_burst_threshold(),
            burst_window_seconds: default_burst_window_seconds(),
            lookback_days: default_lookback_days(),
        }
    }
}

fn default_burst_threshold() -> u32 {
    5
}

fn default_burst_window_seconds() -> u64 {
    300
}

fn default_lookback_days() -> u32 {
    30
}
