use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ErrorContext;

/// An error that can be surfaced to a person.
///
/// Implemented by the domain error enums of the workspace so that the
/// presentation layer only ever deals with [`ErrorReport`].
pub trait ReportableError: std::fmt::Display {
    /// Stable error code from [`crate::codes`]
    fn code(&self) -> &'static str;

    /// Message safe to show in a banner
    fn user_message(&self) -> String;

    /// Whether the user can retry or pick another action.
    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Serialisable error payload handed to the display surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Unique error ID for log correlation
    pub error_id: String,
    pub code: String,
    pub message: String,
    pub recoverable: bool,
    pub context: ErrorContext,
    pub timestamp: DateTime<Utc>,
}
