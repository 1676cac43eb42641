use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppointmentError;

/// Reason recorded when the booking flow did not provide one
pub const DEFAULT_REASON: &str = "Consultation";

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Fresh identifier for records created locally
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Backend identifier of an appointment
    AppointmentId
);
opaque_id!(DoctorId);
opaque_id!(PatientId);
opaque_id!(PrescriptionId);

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Booked,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppointmentError::Validation(format!("unknown appointment status {:?}", s)))
    }
}

/// Doctor or patient as referenced by an appointment.
///
/// The backend sends either the bare identifier or, when the reference was
/// expanded, the profile itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartyRef {
    Profile(PartyProfile),
    Id(String),
}

impl PartyRef {
    pub fn from_id(id: impl Into<String>) -> Self {
        PartyRef::Id(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            PartyRef::Profile(profile) => &profile.id,
            PartyRef::Id(id) => id,
        }
    }

    /// Only known when the reference was expanded
    pub fn display_name(&self) -> Option<&str> {
        match self {
            PartyRef::Profile(profile) => Some(profile.name.as_str()),
            PartyRef::Id(_) => None,
        }
    }
}

/// Expanded doctor or patient profile
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// Profiles end up in `?appointment` log fields; keep PHI out of Debug.
impl fmt::Debug for PartyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartyProfile")
            .field("id", &self.id)
            .field("name", &"[PHI]")
            .finish_non_exhaustive()
    }
}

/// Scheduled consultation between a patient and a doctor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(alias = "_id")]
    pub id: AppointmentId,
    #[serde(rename = "patientId", alias = "patient")]
    pub patient: PartyRef,
    #[serde(rename = "doctorId", alias = "doctor")]
    pub doctor: PartyRef,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_reason", deserialize_with = "deserialize_reason")]
    pub reason: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// New `booked` appointment, as the booking flow would create it.
    pub fn booked(
        patient: PartyRef,
        doctor: PartyRef,
        scheduled_at: DateTime<Utc>,
        reason: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AppointmentId::generate(),
            patient,
            doctor,
            scheduled_at,
            reason: normalize_reason(reason),
            status: AppointmentStatus::Booked,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn patient_id(&self) -> PatientId {
        PatientId::new(self.patient.id())
    }

    pub fn doctor_id(&self) -> DoctorId {
        DoctorId::new(self.doctor.id())
    }
}

fn default_reason() -> String {
    DEFAULT_REASON.to_string()
}

fn normalize_reason(reason: Option<String>) -> String {
    reason
        .filter(|reason| !reason.trim().is_empty())
        .unwrap_or_else(default_reason)
}

fn deserialize_reason<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(normalize_reason)
}

/// One line item of a prescription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instructions: String,
}

impl Medication {
    pub fn new(name: &str, dosage: &str, duration: &str) -> Self {
        Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            duration: duration.to_string(),
            instructions: String::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = instructions.to_string();
        self
    }

    /// Name, dosage and duration are all non-blank. Instructions are optional.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.dosage, &self.duration]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            dosage: self.dosage.trim().to_string(),
            duration: self.duration.trim().to_string(),
            instructions: self.instructions.trim().to_string(),
        }
    }
}

/// Create payload of the prescription backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub appointment_id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub medications: Vec<Medication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewPrescription {
    pub fn for_appointment(appointment: &Appointment, medications: Vec<Medication>, notes: Option<String>) -> Self {
        Self {
            appointment_id: appointment.id.clone(),
            doctor_id: appointment.doctor_id(),
            patient_id: appointment.patient_id(),
            medications,
            notes,
        }
    }
}

/// Stored prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(alias = "_id")]
    pub id: PrescriptionId,
    pub appointment_id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub medications: Vec<Medication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
