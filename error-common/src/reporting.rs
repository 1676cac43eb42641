// Error reporting utilities

use chrono::Utc;
use uuid::Uuid;

use crate::context::ErrorContext;
use crate::types::{ErrorReport, ReportableError};

/// Turns domain errors into [`ErrorReport`]s and logs them once.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report<E: ReportableError + ?Sized>(&self, error: &E, context: ErrorContext) -> ErrorReport {
        let error_id = Uuid::new_v4().to_string();

        tracing::error!(
            error_id = %error_id,
            error_code = error.code(),
            recoverable = error.is_recoverable(),
            context = ?context.additional,
            "Error reported: {}",
            error
        );

        ErrorReport {
            error_id,
            code: error.code().to_string(),
            message: error.user_message(),
            recoverable: error.is_recoverable(),
            context,
            timestamp: Utc::now(),
        }
    }
}
