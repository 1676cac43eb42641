use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::{AppointmentError, Result};
use crate::lifecycle::ensure_transition;
use crate::models::{Appointment, AppointmentId, AppointmentStatus, DoctorId};

/// Backend holding appointment records
///
/// `set_status` is the only mutation this core performs.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments owned by the doctor, unfiltered and in no particular order
    async fn list_for_doctor(&self, doctor_id: &DoctorId) -> Result<Vec<Appointment>>;

    /// Move the appointment to `status`, bumping `updated_at`.
    ///
    /// Fails with [`AppointmentError::InvalidTransition`] when `status` is
    /// not reachable from the current status.
    async fn set_status(&self, appointment_id: &AppointmentId, status: AppointmentStatus) -> Result<Appointment>;
}

/// In-memory appointment store for development and testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentStore {
    appointments: Arc<DashMap<AppointmentId, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, standing in for the booking flow.
    pub fn insert(&self, appointment: Appointment) -> AppointmentId {
        let id = appointment.id.clone();
        self.appointments.insert(id.clone(), appointment);
        id
    }

    pub fn get(&self, appointment_id: &AppointmentId) -> Option<Appointment> {
        self.appointments.get(appointment_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn list_for_doctor(&self, doctor_id: &DoctorId) -> Result<Vec<Appointment>> {
        let appointments: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|entry| entry.value().doctor.id() == doctor_id.as_str())
            .map(|entry| entry.value().clone())
            .collect();

        debug!(doctor_id = %doctor_id, count = appointments.len(), "Listed appointments");
        Ok(appointments)
    }

    async fn set_status(&self, appointment_id: &AppointmentId, status: AppointmentStatus) -> Result<Appointment> {
        let mut entry = self
            .appointments
            .get_mut(appointment_id)
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.clone()))?;

        ensure_transition(&entry, status)?;

        let previous = entry.status;
        entry.status = status;
        entry.updated_at = Utc::now().max(entry.updated_at);

        info!(appointment_id = %appointment_id, from = %previous, to = %status, "Appointment status updated");
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PartyRef;
    use chrono::Duration;

    fn booked_for(doctor: &str) -> Appointment {
        Appointment::booked(
            PartyRef::from_id("pat"),
            PartyRef::from_id(doctor),
            Utc::now() + Duration::hours(1),
            None,
        )
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_doctor() {
        let store = InMemoryAppointmentStore::new();
        store.insert(booked_for("doc-a"));
        store.insert(booked_for("doc-a"));
        store.insert(booked_for("doc-b"));

        let mine = store.list_for_doctor(&DoctorId::new("doc-a")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|a| a.doctor.id() == "doc-a"));
    }

    #[tokio::test]
    async fn test_set_status_transitions_and_bumps_updated_at() {
        let store = InMemoryAppointmentStore::new();
        let original = booked_for("doc-a");
        let id = store.insert(original.clone());

        let updated = store.set_status(&id, AppointmentStatus::Completed).await.unwrap();
        assert_eq!(updated.status, AppointmentStatus::Completed);
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(store.get(&id).unwrap().status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_terminal_status_rejects_further_transitions() {
        let store = InMemoryAppointmentStore::new();
        let id = store.insert(booked_for("doc-a"));
        store.set_status(&id, AppointmentStatus::Cancelled).await.unwrap();

        for to in AppointmentStatus::ALL {
            let err = store.set_status(&id, to).await.unwrap_err();
            assert!(matches!(err, AppointmentError::InvalidTransition { .. }));
        }
        assert_eq!(store.get(&id).unwrap().status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_unknown_appointment() {
        let store = InMemoryAppointmentStore::new();
        let err = store
            .set_status(&AppointmentId::new("missing"), AppointmentStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err, AppointmentError::NotFound(AppointmentId::new("missing")));
    }
}
