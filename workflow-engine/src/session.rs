use std::sync::{Arc, Weak};

use appointment_service::{Appointment, AppointmentId, Prescription};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::draft::MedicationDraft;

/// Open sessions, one per appointment
pub(crate) type SessionRegistry = DashMap<AppointmentId, Uuid>;

/// Registration of a session in the coordinator's registry.
///
/// Shared by every clone of a session; the registration is released when
/// the last clone goes away, unless the coordinator already closed it or a
/// newer session took its place.
#[derive(Debug)]
pub(crate) struct SessionLease {
    registry: Weak<SessionRegistry>,
    appointment_id: AppointmentId,
    session_id: Uuid,
}

impl SessionLease {
    pub(crate) fn new(registry: &Arc<SessionRegistry>, appointment_id: AppointmentId, session_id: Uuid) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            appointment_id,
            session_id,
        }
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_if(&self.appointment_id, |_, open| *open == self.session_id);
        }
    }
}

/// Local state of one open completion dialog
///
/// Only the coordinator mutates a session; callers read it to render the
/// form and hand it back for every action. Dropping every handle to a
/// session closes it like [`crate::CompletionCoordinator::discard`].
#[derive(Debug, Clone, Serialize)]
pub struct CompletionSession {
    appointment: Appointment,
    draft: MedicationDraft,
    notes: Option<String>,
    opened_at: DateTime<Utc>,
    #[serde(skip)]
    lease: Arc<SessionLease>,
}

impl CompletionSession {
    /// The lease must already be registered under `appointment.id`.
    pub(crate) fn new(appointment: Appointment, lease: SessionLease) -> Self {
        Self {
            appointment,
            draft: MedicationDraft::new(),
            notes: None,
            opened_at: Utc::now(),
            lease: Arc::new(lease),
        }
    }

    pub fn id(&self) -> Uuid {
        self.lease.session_id
    }

    /// The appointment as it was when the session opened
    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn appointment_id(&self) -> &AppointmentId {
        &self.appointment.id
    }

    pub fn draft(&self) -> &MedicationDraft {
        &self.draft
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn can_complete_with_prescription(&self) -> bool {
        self.draft.has_complete_medication()
    }

    pub(crate) fn draft_mut(&mut self) -> &mut MedicationDraft {
        &mut self.draft
    }

    pub(crate) fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes.filter(|notes| !notes.trim().is_empty());
    }
}

/// What selecting an appointment opens
#[derive(Debug, Clone)]
pub enum WorkflowEntry {
    Completion(CompletionSession),
    Details(Appointment),
}

impl WorkflowEntry {
    pub fn appointment(&self) -> &Appointment {
        match self {
            WorkflowEntry::Completion(session) => session.appointment(),
            WorkflowEntry::Details(appointment) => appointment,
        }
    }

    pub fn into_session(self) -> Option<CompletionSession> {
        match self {
            WorkflowEntry::Completion(session) => Some(session),
            WorkflowEntry::Details(_) => None,
        }
    }
}

/// Result of completing with a prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    pub appointment: Appointment,
    pub prescription: Prescription,
    /// The prescription came from an earlier attempt whose status update failed.
    pub reconciled: bool,
}
