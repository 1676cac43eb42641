use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::models::{Appointment, AppointmentId, AppointmentStatus, DoctorId};
use crate::store::AppointmentStore;

/// Owner of the current appointment snapshot
///
/// Readers get an immutable `Arc<Vec<Appointment>>`; every change publishes a
/// new snapshot instead of mutating the one readers hold. The snapshot only
/// changes after the store has confirmed a write, so a failed call never
/// leaves an optimistic update behind.
pub struct AppointmentBook {
    store: Arc<dyn AppointmentStore>,
    snapshot: RwLock<Arc<Vec<Appointment>>>,
}

impl AppointmentBook {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Reload the doctor's appointments from the store.
    pub async fn refresh(&self, doctor_id: &DoctorId) -> Result<Arc<Vec<Appointment>>> {
        let appointments = Arc::new(self.store.list_for_doctor(doctor_id).await?);
        *self.snapshot.write() = Arc::clone(&appointments);

        debug!(doctor_id = %doctor_id, count = appointments.len(), "Appointment snapshot refreshed");
        Ok(appointments)
    }

    pub fn snapshot(&self) -> Arc<Vec<Appointment>> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn find(&self, appointment_id: &AppointmentId) -> Option<Appointment> {
        self.snapshot
            .read()
            .iter()
            .find(|appointment| &appointment.id == appointment_id)
            .cloned()
    }

    /// Transition through the store, then publish the confirmed record.
    pub async fn set_status(&self, appointment_id: &AppointmentId, status: AppointmentStatus) -> Result<Appointment> {
        let updated = self.store.set_status(appointment_id, status).await?;
        self.apply(updated.clone());
        Ok(updated)
    }

    fn apply(&self, updated: Appointment) {
        let mut guard = self.snapshot.write();
        let mut next: Vec<Appointment> = (**guard).clone();

        match next.iter_mut().find(|appointment| appointment.id == updated.id) {
            Some(slot) => *slot = updated,
            None => next.push(updated),
        }
        *guard = Arc::new(next);
    }
}
