use error_common::{codes, ReportableError};
use thiserror::Error;

use crate::models::{AppointmentId, AppointmentStatus};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Invalid transition for appointment {appointment_id}: {from} -> {to}")]
    InvalidTransition {
        appointment_id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment not found: {0}")]
    NotFound(AppointmentId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote error: {0}")]
    Remote(String),
}

impl ReportableError for AppointmentError {
    fn code(&self) -> &'static str {
        match self {
            AppointmentError::InvalidTransition { .. } => codes::workflow::INVALID_TRANSITION,
            AppointmentError::NotFound(_) => codes::remote::NOT_FOUND,
            AppointmentError::Validation(_) => codes::validation::INVALID_INPUT,
            AppointmentError::Remote(_) => codes::remote::TRANSPORT_FAILED,
        }
    }

    fn user_message(&self) -> String {
        match self {
            AppointmentError::InvalidTransition { from, .. } => {
                format!("This appointment is already {} and can no longer be changed.", from)
            }
            AppointmentError::NotFound(_) => "The appointment no longer exists.".to_string(),
            AppointmentError::Validation(message) => message.clone(),
            AppointmentError::Remote(_) => {
                "The hospital server could not complete the request. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppointmentError>;
