//! Appointment state machine
//!
//! ```text
//!            ┌──────────► completed
//!   booked ──┤
//!            └──────────► cancelled
//! ```
//!
//! Both targets are terminal: nothing leaves them, and there is no way back
//! to `booked`.

use serde::{Deserialize, Serialize};

use crate::error::{AppointmentError, Result};
use crate::models::{Appointment, AppointmentStatus};

impl AppointmentStatus {
    /// Statuses reachable in one step
    pub fn allowed_transitions(self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Booked => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: AppointmentStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Fails with [`AppointmentError::InvalidTransition`] unless `to` is reachable
/// from the appointment's current status.
pub fn ensure_transition(appointment: &Appointment, to: AppointmentStatus) -> Result<()> {
    if appointment.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppointmentError::InvalidTransition {
            appointment_id: appointment.id.clone(),
            from: appointment.status,
            to,
        })
    }
}

/// What selecting an appointment opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    /// Prescription entry form of the completion workflow
    OpenCompletion,
    /// Read-only detail view
    ViewDetails,
}

impl Affordance {
    pub fn for_status(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Booked => Affordance::OpenCompletion,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => Affordance::ViewDetails,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Affordance::OpenCompletion => "Start consultation",
            Affordance::ViewDetails => "View details",
        }
    }
}
