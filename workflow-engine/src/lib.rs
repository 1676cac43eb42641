//! Consultation completion workflow for CareDesk
//!
//! A doctor selects an appointment. Booked appointments open a completion
//! session with a medication draft; completed and cancelled ones open
//! read-only. From a session the doctor can:
//!
//! - **Complete with prescription**: create a prescription from the complete
//!   medication entries, then mark the appointment completed
//! - **Complete without prescription**: mark the appointment completed
//! - **Cancel**: mark the appointment cancelled
//!
//! Prescription creation and the status update are two remote calls. When
//! only the first succeeds, the prescription is kept in the
//! [`OrphanLedger`] and a retry only repeats the status update, so an
//! appointment never ends up with two prescriptions.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use appointment_service::{Appointment, DoctorId, InMemoryAppointmentStore, InMemoryPrescriptionWriter, PartyRef};
//! use chrono::Utc;
//! use workflow_engine::{MedicationEdit, MedicationField, WorkflowEngine, WorkflowSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryAppointmentStore::new();
//! let appointment_id = store.insert(Appointment::booked(
//!     PartyRef::from_id("patient-1"),
//!     PartyRef::from_id("doctor-1"),
//!     Utc::now(),
//!     Some("Fever".to_string()),
//! ));
//!
//! let engine = WorkflowEngine::new(
//!     Arc::new(store),
//!     Arc::new(InMemoryPrescriptionWriter::new()),
//!     WorkflowSettings::default(),
//! );
//! engine.load_doctor(&DoctorId::new("doctor-1")).await?;
//!
//! let coordinator = engine.coordinator();
//! let mut session = coordinator
//!     .open(&appointment_id)?
//!     .into_session()
//!     .expect("booked appointments open a session");
//!
//! for (field, value) in [
//!     (MedicationField::Name, "Paracetamol"),
//!     (MedicationField::Dosage, "500mg"),
//!     (MedicationField::Duration, "5 days"),
//! ] {
//!     coordinator.edit(&mut session, MedicationEdit::Update { index: 0, field, value: value.to_string() });
//! }
//!
//! let outcome = coordinator.complete_with_prescription(&mut session).await?;
//! assert_eq!(outcome.prescription.medications.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod compensation;
pub mod coordinator;
pub mod draft;
pub mod engine;
pub mod error;
pub mod events;
pub mod session;
pub mod state_machine;

pub use compensation::*;
pub use coordinator::*;
pub use draft::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use session::*;
pub use state_machine::*;
