// Logger configuration
use serde::{Deserialize, Serialize};

/// Replacement applied after the built-in detectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Fallback filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit one JSON object per line instead of the human format
    pub json: bool,
    pub redaction_enabled: bool,
    /// Replace detected values by a short hash instead of a mask
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<CustomPattern>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            redaction_enabled: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}
