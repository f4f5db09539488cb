//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Endpoint of the external classification capability
    #[serde(default = "default_classifier_endpoint")]
    pub classifier_endpoint: String,

    /// Bound on the classification call in milliseconds
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_timeout_ms: u64,

    /// Directory for the JSONL audit trail
    #[serde(default = "default_audit_dir")]
    pub audit_dir: PathBuf,

    /// Characters of input kept as the audit preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Bounded pattern-scan window in bytes
    #[serde(default = "default_scan_window_bytes")]
    pub scan_window_bytes: usize,
}

impl GatewayConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Classification call timeout as a Duration
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            classifier_endpoint: default_classifier_endpoint(),
            classifier_timeout_ms: default_classifier_timeout_ms(),
            audit_dir: default_audit_dir(),
            preview_chars: default_preview_chars(),
            scan_window_bytes: default_scan_window_bytes(),
        }
    }
}

fn default_classifier_endpoint() -> String {
    "http://127.0.0.1:8787/v1/generate".to_string()
}

fn default_classifier_timeout_ms() -> u64 {
    5_000
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from("./audit")
}

fn default_preview_chars() -> usize {
    80
}

fn default_scan_window_bytes() -> usize {
    64 * 1024
}
