use std::sync::Arc;

use appointment_service::{
    ensure_transition, Affordance, Appointment, AppointmentBook, AppointmentId, AppointmentStatus, NewPrescription,
    PrescriptionWriter,
};
use dashmap::mapref::entry::Entry;
use error_common::{ErrorContext, ErrorReport, ErrorReporter};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::compensation::OrphanLedger;
use crate::draft::MedicationEdit;
use crate::error::{Result, WorkflowError};
use crate::events::{EventPublisher, WorkflowEvent};
use crate::session::{CompletionOutcome, CompletionSession, SessionLease, SessionRegistry, WorkflowEntry};
use crate::state_machine::{action_states, ActionState};

/// Drives the completion dialog of a doctor's appointments
///
/// Every precondition is checked against the current snapshot of the
/// [`AppointmentBook`] before any remote call. Remote calls inside one action
/// run strictly one after the other, and the book only changes once the
/// store has confirmed.
pub struct CompletionCoordinator {
    book: Arc<AppointmentBook>,
    prescriptions: Arc<dyn PrescriptionWriter>,
    events: EventPublisher,
    orphans: OrphanLedger,
    open_sessions: Arc<SessionRegistry>,
    reporter: ErrorReporter,
}

impl CompletionCoordinator {
    pub fn new(book: Arc<AppointmentBook>, prescriptions: Arc<dyn PrescriptionWriter>, events: EventPublisher) -> Self {
        Self {
            book,
            prescriptions,
            events,
            orphans: OrphanLedger::new(),
            open_sessions: Arc::new(SessionRegistry::new()),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn book(&self) -> &Arc<AppointmentBook> {
        &self.book
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn orphans(&self) -> &OrphanLedger {
        &self.orphans
    }

    pub fn is_open(&self, appointment_id: &AppointmentId) -> bool {
        self.open_sessions.contains_key(appointment_id)
    }

    /// Booked appointments open a completion session, terminal ones open read-only.
    #[instrument(skip_all, fields(appointment_id = %appointment_id))]
    pub fn open(&self, appointment_id: &AppointmentId) -> Result<WorkflowEntry> {
        let appointment = self.current(appointment_id)?;
        let affordance = Affordance::for_status(appointment.status);

        let entry = match affordance {
            Affordance::ViewDetails => WorkflowEntry::Details(appointment),
            Affordance::OpenCompletion => {
                let session_id = Uuid::new_v4();
                match self.open_sessions.entry(appointment_id.clone()) {
                    Entry::Occupied(_) => return Err(WorkflowError::SessionInProgress(appointment_id.clone())),
                    Entry::Vacant(slot) => {
                        slot.insert(session_id);
                    }
                }
                // Built after the shard lock is gone: dropping a lease takes it again.
                let lease = SessionLease::new(&self.open_sessions, appointment_id.clone(), session_id);
                WorkflowEntry::Completion(CompletionSession::new(appointment, lease))
            }
        };

        let session_id = match &entry {
            WorkflowEntry::Completion(session) => Some(session.id()),
            WorkflowEntry::Details(_) => None,
        };
        debug!(?affordance, "Workflow opened");
        self.events.publish(WorkflowEvent::WorkflowOpened {
            appointment_id: appointment_id.clone(),
            session_id,
            affordance,
        });

        Ok(entry)
    }

    /// Returns whether the draft changed.
    pub fn edit(&self, session: &mut CompletionSession, edit: MedicationEdit) -> bool {
        let changed = session.draft_mut().apply(edit);
        if changed {
            self.events.publish(WorkflowEvent::MedicationsChanged {
                appointment_id: session.appointment_id().clone(),
                session_id: session.id(),
                entries: session.draft().len(),
                can_complete_with_prescription: session.can_complete_with_prescription(),
            });
        }
        changed
    }

    /// Actions for the session's appointment as the book sees it now.
    ///
    /// Empty once the appointment is terminal or no longer in the book.
    pub fn actions(&self, session: &CompletionSession) -> Vec<ActionState> {
        self.book
            .find(session.appointment_id())
            .map(|current| action_states(current.status, session.draft()))
            .unwrap_or_default()
    }

    /// Notes travel with the prescription. Blank notes are dropped.
    pub fn set_notes(&self, session: &mut CompletionSession, notes: Option<String>) {
        session.set_notes(notes);
    }

    /// Create the prescription, then complete the appointment.
    ///
    /// If an earlier attempt already created the prescription but failed to
    /// complete the appointment, that prescription is reused and only the
    /// status update is retried.
    #[instrument(skip_all, fields(appointment_id = %session.appointment_id()))]
    pub async fn complete_with_prescription(&self, session: &mut CompletionSession) -> Result<CompletionOutcome> {
        let appointment_id = session.appointment_id().clone();
        let result = self.run_completion_with_prescription(session).await;

        match &result {
            Ok(outcome) => {
                self.close(&appointment_id);
                info!(prescription_id = %outcome.prescription.id, reconciled = outcome.reconciled, "Appointment completed with prescription");
                self.events.publish(WorkflowEvent::CompletionSucceeded {
                    appointment_id,
                    prescription_id: Some(outcome.prescription.id.clone()),
                });
            }
            Err(error) => self.completion_failed(appointment_id, error),
        }
        result
    }

    async fn run_completion_with_prescription(&self, session: &CompletionSession) -> Result<CompletionOutcome> {
        let appointment_id = session.appointment_id();
        let appointment = self.transition_source(appointment_id, AppointmentStatus::Completed)?;
        self.ensure_session_open(session)?;

        let (prescription, reconciled) = match self.orphans.awaiting(appointment_id) {
            // The parked prescription was validated when it was created; the
            // current draft is not consulted, even if blank.
            Some(prescription) => {
                info!(prescription_id = %prescription.id, "Reusing prescription from an earlier attempt");
                (prescription, true)
            }
            None => {
                let medications = session.draft().complete_entries();
                if medications.is_empty() {
                    return Err(WorkflowError::Validation(
                        "At least one medication needs a name, dosage and duration.".to_string(),
                    ));
                }
                let payload = NewPrescription::for_appointment(&appointment, medications, session.notes().map(str::to_string));
                (self.prescriptions.create(payload).await?, false)
            }
        };

        match self.book.set_status(appointment_id, AppointmentStatus::Completed).await {
            Ok(appointment) => {
                if reconciled {
                    self.orphans.resolve(appointment_id);
                }
                Ok(CompletionOutcome {
                    appointment,
                    prescription,
                    reconciled,
                })
            }
            Err(source) => {
                if reconciled {
                    self.orphans.note_failed_attempt(appointment_id);
                } else {
                    self.orphans.record(prescription.clone());
                }
                Err(WorkflowError::PartialFailure {
                    appointment_id: appointment_id.clone(),
                    prescription_id: prescription.id,
                    source,
                })
            }
        }
    }

    #[instrument(skip_all, fields(appointment_id = %session.appointment_id()))]
    pub async fn complete_without_prescription(&self, session: &mut CompletionSession) -> Result<Appointment> {
        let appointment_id = session.appointment_id().clone();
        let result = self.run_completion_without_prescription(session).await;

        match &result {
            Ok(_) => {
                self.close(&appointment_id);
                info!("Appointment completed without prescription");
                self.events.publish(WorkflowEvent::CompletionSucceeded {
                    appointment_id,
                    prescription_id: None,
                });
            }
            Err(error) => self.completion_failed(appointment_id, error),
        }
        result
    }

    async fn run_completion_without_prescription(&self, session: &CompletionSession) -> Result<Appointment> {
        let appointment_id = session.appointment_id();
        self.transition_source(appointment_id, AppointmentStatus::Completed)?;
        self.ensure_session_open(session)?;
        self.transition(appointment_id, AppointmentStatus::Completed).await
    }

    /// Cancel a booked appointment. Any open session for it is closed.
    #[instrument(skip_all, fields(appointment_id = %appointment_id))]
    pub async fn cancel(&self, appointment_id: &AppointmentId) -> Result<Appointment> {
        let result = match self.transition_source(appointment_id, AppointmentStatus::Cancelled) {
            Ok(_) => self.transition(appointment_id, AppointmentStatus::Cancelled).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(_) => {
                self.close(appointment_id);
                info!("Appointment cancelled");
                self.events.publish(WorkflowEvent::CancellationSucceeded {
                    appointment_id: appointment_id.clone(),
                });
            }
            Err(error) => {
                let error = self.report(appointment_id, error);
                self.events.publish(WorkflowEvent::CancellationFailed {
                    appointment_id: appointment_id.clone(),
                    error,
                });
            }
        }
        result
    }

    /// Close the dialog without acting. Remote calls already made stand.
    pub fn discard(&self, session: CompletionSession) {
        let removed = self
            .open_sessions
            .remove_if(session.appointment_id(), |_, open| *open == session.id())
            .is_some();
        debug!(appointment_id = %session.appointment_id(), removed, "Completion session discarded");
    }

    fn current(&self, appointment_id: &AppointmentId) -> Result<Appointment> {
        self.book
            .find(appointment_id)
            .ok_or_else(|| WorkflowError::NotFound(appointment_id.clone()))
    }

    /// Current record, provided `to` is reachable from it.
    ///
    /// A parked prescription can no longer be reused once its appointment
    /// is terminal, so it is superseded here.
    fn transition_source(&self, appointment_id: &AppointmentId, to: AppointmentStatus) -> Result<Appointment> {
        let appointment = self.current(appointment_id)?;
        if let Err(error) = ensure_transition(&appointment, to) {
            self.orphans.supersede(appointment_id);
            return Err(error.into());
        }
        Ok(appointment)
    }

    /// Status update without a prescription. A parked prescription for the
    /// appointment will never be attached, so it is superseded.
    async fn transition(&self, appointment_id: &AppointmentId, to: AppointmentStatus) -> Result<Appointment> {
        let appointment = self.book.set_status(appointment_id, to).await?;
        self.orphans.supersede(appointment_id);
        Ok(appointment)
    }

    fn ensure_session_open(&self, session: &CompletionSession) -> Result<()> {
        match self.open_sessions.get(session.appointment_id()) {
            Some(open) if *open == session.id() => Ok(()),
            _ => Err(WorkflowError::SessionClosed(session.appointment_id().clone())),
        }
    }

    fn close(&self, appointment_id: &AppointmentId) {
        self.open_sessions.remove(appointment_id);
    }

    fn report(&self, appointment_id: &AppointmentId, error: &WorkflowError) -> ErrorReport {
        self.reporter
            .report(error, ErrorContext::new().add_context("appointment_id", appointment_id.as_str()))
    }

    fn completion_failed(&self, appointment_id: AppointmentId, error: &WorkflowError) {
        let error = self.report(&appointment_id, error);
        self.events.publish(WorkflowEvent::CompletionFailed { appointment_id, error });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appointment_service::{DoctorId, InMemoryAppointmentStore, InMemoryPrescriptionWriter, PartyRef};
    use chrono::Utc;

    async fn coordinator_with_booked() -> (CompletionCoordinator, AppointmentId) {
        let store = InMemoryAppointmentStore::new();
        let appointment_id = store.insert(Appointment::booked(
            PartyRef::from_id("pat"),
            PartyRef::from_id("doc"),
            Utc::now(),
            None,
        ));
        let book = Arc::new(AppointmentBook::new(Arc::new(store)));
        book.refresh(&DoctorId::new("doc")).await.unwrap();

        let coordinator = CompletionCoordinator::new(
            book,
            Arc::new(InMemoryPrescriptionWriter::new()),
            EventPublisher::default(),
        );
        (coordinator, appointment_id)
    }

    #[tokio::test]
    async fn test_discarded_session_cannot_act() {
        let (coordinator, appointment_id) = coordinator_with_booked().await;
        let session = coordinator.open(&appointment_id).unwrap().into_session().unwrap();
        let mut stale = session.clone();
        coordinator.discard(session);

        let error = coordinator.complete_without_prescription(&mut stale).await.unwrap_err();
        assert_eq!(error, WorkflowError::SessionClosed(appointment_id));
    }

    #[tokio::test]
    async fn test_discarding_a_stale_session_keeps_the_current_one() {
        let (coordinator, appointment_id) = coordinator_with_booked().await;
        let first = coordinator.open(&appointment_id).unwrap().into_session().unwrap();
        let stale = first.clone();
        coordinator.discard(first);

        let _current = coordinator.open(&appointment_id).unwrap();
        coordinator.discard(stale);
        assert!(coordinator.is_open(&appointment_id));
    }

    #[tokio::test]
    async fn test_dropped_session_frees_the_appointment() {
        let (coordinator, appointment_id) = coordinator_with_booked().await;
        {
            let _lost = coordinator.open(&appointment_id).unwrap().into_session().unwrap();
            assert!(coordinator.is_open(&appointment_id));
        }
        assert!(!coordinator.is_open(&appointment_id));

        let mut session = coordinator.open(&appointment_id).unwrap().into_session().unwrap();
        let completed = coordinator.complete_without_prescription(&mut session).await.unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_session_stays_open_while_a_clone_is_alive() {
        let (coordinator, appointment_id) = coordinator_with_booked().await;
        let session = coordinator.open(&appointment_id).unwrap().into_session().unwrap();
        let kept = session.clone();
        drop(session);

        assert!(coordinator.is_open(&appointment_id));
        drop(kept);
        assert!(!coordinator.is_open(&appointment_id));
    }

    #[tokio::test]
    async fn test_actions_follow_the_current_record() {
        let (coordinator, appointment_id) = coordinator_with_booked().await;
        let session = coordinator.open(&appointment_id).unwrap().into_session().unwrap();
        assert_eq!(coordinator.actions(&session).len(), 3);

        coordinator.cancel(&appointment_id).await.unwrap();
        assert!(coordinator.actions(&session).is_empty());
    }

    #[tokio::test]
    async fn test_blank_notes_are_dropped() {
        let (coordinator, appointment_id) = coordinator_with_booked().await;
        let mut session = coordinator.open(&appointment_id).unwrap().into_session().unwrap();

        coordinator.set_notes(&mut session, Some("  ".to_string()));
        assert_eq!(session.notes(), None);
        coordinator.set_notes(&mut session, Some("Rest for two days".to_string()));
        assert_eq!(session.notes(), Some("Rest for two days"));
    }
}
