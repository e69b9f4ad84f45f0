//! Share-link lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Settings governing share-link creation and consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Public base URL that share tokens are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// How many fresh tokens to try when insertion hits a token collision.
    #[serde(default = "default_token_retry_limit")]
    pub token_retry_limit: u32,
    /// How many times a transient store failure is retried before surfacing.
    #[serde(default = "default_store_retry_limit")]
    pub store_retry_limit: u32,
    /// Backoff between store retries, in milliseconds.
    #[serde(default = "default_store_retry_backoff_ms")]
    pub store_retry_backoff_ms: u64,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_retry_limit: default_token_retry_limit(),
            store_retry_limit: default_store_retry_limit(),
            store_retry_backoff_ms: default_store_retry_backoff_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_token_retry_limit() -> u32 {
    3
}

fn default_store_retry_limit() -> u32 {
    3
}

fn default_store_retry_backoff_ms() -> u64 {
    50
}
