//! Appointment records and everything that reads or writes them
//!
//! - **Models**: appointments, party references, medications, prescriptions
//! - **Lifecycle**: the `booked → completed | cancelled` state machine and
//!   the UI affordance each state allows
//! - **Appointment Store**: list a doctor's appointments, transition status
//! - **Prescription Writer**: create the prescription of a consultation
//! - **Appointment Book**: the single owner of the current snapshot
//! - **Projection**: pure filters, sorts and dashboard figures over snapshots
//!
//! Both collaborators come in two flavours: an in-memory implementation for
//! development and tests, and a REST implementation talking to the hospital
//! backend.
//!
//! # Example
//!
//! ```rust
//! use appointment_service::*;
//! use chrono::{Duration, Utc};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let store = InMemoryAppointmentStore::new();
//! store.insert(Appointment::booked(
//!     PartyRef::from_id("pat-1"),
//!     PartyRef::from_id("doc-1"),
//!     Utc::now() + Duration::hours(2),
//!     None,
//! ));
//!
//! let list = store.list_for_doctor(&DoctorId::new("doc-1")).await?;
//! let booked = filter_by_status(&list, StatusFilter::Only(AppointmentStatus::Booked));
//! assert_eq!(booked.len(), 1);
//! assert_eq!(booked[0].reason, "Consultation");
//! # Ok(())
//! # }
//! ```

pub mod book;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod prescriptions;
pub mod projection;
pub mod rest;
pub mod store;

pub use book::*;
pub use error::*;
pub use lifecycle::*;
pub use models::*;
pub use prescriptions::*;
pub use projection::*;
pub use rest::*;
pub use store::*;
