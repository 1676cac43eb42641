use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::info;

use crate::error::{AppointmentError, Result};
use crate::models::{AppointmentId, NewPrescription, Prescription, PrescriptionId};

/// Creates the prescription of a consultation
///
/// Prescriptions are immutable once written; there is no update or delete.
#[async_trait]
pub trait PrescriptionWriter: Send + Sync {
    /// Callers drop incomplete medication entries beforehand and never call
    /// this with an empty set. A write with no medication is rejected with
    /// [`AppointmentError::Validation`].
    async fn create(&self, prescription: NewPrescription) -> Result<Prescription>;
}

/// In-memory prescription writer for development and testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrescriptionWriter {
    prescriptions: Arc<DashMap<PrescriptionId, Prescription>>,
}

impl InMemoryPrescriptionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_appointment(&self, appointment_id: &AppointmentId) -> Vec<Prescription> {
        self.prescriptions
            .iter()
            .filter(|entry| &entry.value().appointment_id == appointment_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.prescriptions.len()
    }
}

#[async_trait]
impl PrescriptionWriter for InMemoryPrescriptionWriter {
    async fn create(&self, prescription: NewPrescription) -> Result<Prescription> {
        if prescription.medications.is_empty() {
            return Err(AppointmentError::Validation(
                "A prescription needs at least one medication".to_string(),
            ));
        }
        if let Some(incomplete) = prescription.medications.iter().position(|m| !m.is_complete()) {
            return Err(AppointmentError::Validation(format!(
                "Medication #{} needs a name, dosage and duration",
                incomplete + 1
            )));
        }

        let stored = Prescription {
            id: PrescriptionId::generate(),
            appointment_id: prescription.appointment_id,
            doctor_id: prescription.doctor_id,
            patient_id: prescription.patient_id,
            medications: prescription.medications,
            notes: prescription.notes,
            created_at: Utc::now(),
        };
        self.prescriptions.insert(stored.id.clone(), stored.clone());

        info!(
            prescription_id = %stored.id,
            appointment_id = %stored.appointment_id,
            medications = stored.medications.len(),
            "Prescription created"
        );
        Ok(stored)
    }
}
