use std::fmt;

use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

/// Top-level CareDesk configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareDeskConfig {
    pub api: ApiConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggerConfig,
}

/// Backend the appointment and prescription collaborators talk to
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without trailing slash, e.g. `https://hms.example.org/api`
    pub base_url: String,
    /// Bearer token issued by the authentication collaborator
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Window of the "upcoming" list, in days from now
    pub upcoming_horizon_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { upcoming_horizon_days: 7 }
    }
}
