//! Prescriptions created by a completion whose status update then failed
//!
//! There is no endpoint that creates a prescription and completes the
//! appointment atomically. When the second call fails, the prescription is
//! parked here so that a retry reuses it instead of creating another one.

use appointment_service::{AppointmentId, Prescription};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanDisposition {
    /// A retry of the completion will reuse the prescription.
    AwaitingTransition,
    /// The appointment ended some other way; the prescription needs cleanup.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedPrescription {
    pub prescription: Prescription,
    pub disposition: OrphanDisposition,
    pub failed_attempts: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct OrphanLedger {
    entries: DashMap<AppointmentId, OrphanedPrescription>,
}

impl OrphanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, prescription: Prescription) {
        warn!(
            appointment_id = %prescription.appointment_id,
            prescription_id = %prescription.id,
            "Prescription created without completing its appointment"
        );

        self.entries.insert(
            prescription.appointment_id.clone(),
            OrphanedPrescription {
                prescription,
                disposition: OrphanDisposition::AwaitingTransition,
                failed_attempts: 1,
                recorded_at: Utc::now(),
            },
        );
    }

    /// The prescription a retry should reuse, if any.
    pub fn awaiting(&self, appointment_id: &AppointmentId) -> Option<Prescription> {
        self.entries
            .get(appointment_id)
            .filter(|orphan| orphan.disposition == OrphanDisposition::AwaitingTransition)
            .map(|orphan| orphan.prescription.clone())
    }

    pub fn note_failed_attempt(&self, appointment_id: &AppointmentId) {
        if let Some(mut orphan) = self.entries.get_mut(appointment_id) {
            orphan.failed_attempts += 1;
        }
    }

    /// Drop the entry once its appointment is completed.
    pub fn resolve(&self, appointment_id: &AppointmentId) -> Option<OrphanedPrescription> {
        let resolved = self.entries.remove(appointment_id).map(|(_, orphan)| orphan);
        if let Some(orphan) = &resolved {
            info!(
                appointment_id = %appointment_id,
                prescription_id = %orphan.prescription.id,
                "Orphaned prescription reconciled"
            );
        }
        resolved
    }

    pub fn supersede(&self, appointment_id: &AppointmentId) {
        if let Some(mut orphan) = self.entries.get_mut(appointment_id) {
            if orphan.disposition == OrphanDisposition::AwaitingTransition {
                orphan.disposition = OrphanDisposition::Superseded;
                warn!(
                    appointment_id = %appointment_id,
                    prescription_id = %orphan.prescription.id,
                    "Orphaned prescription superseded, needs administrative cleanup"
                );
            }
        }
    }

    pub fn get(&self, appointment_id: &AppointmentId) -> Option<OrphanedPrescription> {
        self.entries.get(appointment_id).map(|orphan| orphan.clone())
    }

    /// All entries, oldest first
    pub fn orphans(&self) -> Vec<OrphanedPrescription> {
        let mut orphans: Vec<OrphanedPrescription> = self.entries.iter().map(|entry| entry.value().clone()).collect();
        orphans.sort_by_key(|orphan| orphan.recorded_at);
        orphans
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
