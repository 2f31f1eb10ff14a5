//! Network layer configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::NetworkError;

/// Configuration for the dissemination layer.
///
/// Can be loaded from a TOML file via [`NetworkConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Capacity of each of a peer's three outbound queues. An enqueue on a
    /// full queue is rejected immediately rather than blocking the caller.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Deadline for a single remote call, push or pull, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// RPC method names tracked by each peer's request metrics. The metrics
    /// record always carries exactly these keys; calls to methods outside
    /// the set are not recorded.
    #[serde(default = "default_metric_methods")]
    pub metric_methods: Vec<String>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_queue_capacity() -> usize {
    64
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_metric_methods() -> Vec<String> {
    vec![
        "GetBlock".to_string(),
        "GetBlocks".to_string(),
        "Announce".to_string(),
    ]
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NetworkConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NetworkError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NetworkError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NetworkError> {
        toml::from_str(s).map_err(|e| NetworkError::Config(e.to_string()))
    }

    /// The per-call deadline as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            request_timeout_ms: default_request_timeout_ms(),
            metric_methods: default_metric_methods(),
        }
    }
}
