use appointment_service::{AppointmentError, AppointmentId, AppointmentStatus, PrescriptionId};
use error_common::{codes, ReportableError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid transition for appointment {appointment_id}: {from} -> {to}")]
    InvalidTransition {
        appointment_id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Appointment not found: {0}")]
    NotFound(AppointmentId),

    #[error("Prescription {prescription_id} was created but appointment {appointment_id} was not completed: {source}")]
    PartialFailure {
        appointment_id: AppointmentId,
        prescription_id: PrescriptionId,
        source: AppointmentError,
    },

    #[error("A completion workflow is already open for appointment {0}")]
    SessionInProgress(AppointmentId),

    #[error("The completion workflow for appointment {0} is no longer open")]
    SessionClosed(AppointmentId),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<AppointmentError> for WorkflowError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::InvalidTransition { appointment_id, from, to } => {
                WorkflowError::InvalidTransition { appointment_id, from, to }
            }
            AppointmentError::NotFound(appointment_id) => WorkflowError::NotFound(appointment_id),
            AppointmentError::Validation(message) => WorkflowError::Validation(message),
            AppointmentError::Remote(message) => WorkflowError::Remote(message),
        }
    }
}

impl From<config_engine::ConfigError> for WorkflowError {
    fn from(error: config_engine::ConfigError) -> Self {
        WorkflowError::Configuration(error.to_string())
    }
}

impl From<logger_redacted::LoggerError> for WorkflowError {
    fn from(error: logger_redacted::LoggerError) -> Self {
        WorkflowError::Configuration(error.to_string())
    }
}

impl ReportableError for WorkflowError {
    fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidTransition { .. } => codes::workflow::INVALID_TRANSITION,
            WorkflowError::Validation(_) => codes::validation::INCOMPLETE_MEDICATION,
            WorkflowError::Remote(_) => codes::remote::TRANSPORT_FAILED,
            WorkflowError::NotFound(_) => codes::remote::NOT_FOUND,
            WorkflowError::PartialFailure { .. } => codes::workflow::PARTIAL_FAILURE,
            WorkflowError::SessionInProgress(_) => codes::workflow::SESSION_IN_PROGRESS,
            WorkflowError::SessionClosed(_) => codes::workflow::SESSION_CLOSED,
            WorkflowError::Configuration(_) => codes::configuration::INVALID_CONFIGURATION,
        }
    }

    fn user_message(&self) -> String {
        match self {
            WorkflowError::InvalidTransition { from, .. } => {
                format!("This appointment is already {} and can no longer be changed.", from)
            }
            WorkflowError::Validation(message) => message.clone(),
            WorkflowError::Remote(_) => {
                "The hospital server could not complete the request. Please try again.".to_string()
            }
            WorkflowError::NotFound(_) => "The appointment no longer exists.".to_string(),
            WorkflowError::PartialFailure { .. } => {
                "The prescription was saved but the appointment is still open. Retry to finish the consultation."
                    .to_string()
            }
            WorkflowError::SessionInProgress(_) => {
                "This consultation is already open in another window.".to_string()
            }
            WorkflowError::SessionClosed(_) => "This consultation window was closed.".to_string(),
            WorkflowError::Configuration(message) => format!("CareDesk is misconfigured: {}", message),
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, WorkflowError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
