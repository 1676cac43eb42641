use std::path::Path;
use std::sync::Arc;

use appointment_service::{
    filter_by_search, filter_by_status, sort_by_date_descending, summarize, today, upcoming, Appointment,
    AppointmentBook, AppointmentStore, AppointmentSummary, DoctorId, PrescriptionWriter, RestAppointmentStore,
    RestClient, RestPrescriptionWriter, StatusFilter, DEFAULT_UPCOMING_HORIZON_DAYS,
};
use chrono::{DateTime, TimeZone};
use config_engine::{CareDeskConfig, ConfigEngine};
use serde::Serialize;
use tracing::info;

use crate::coordinator::CompletionCoordinator;
use crate::error::Result;
use crate::events::{EventPublisher, DEFAULT_EVENT_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub upcoming_horizon_days: u32,
    pub event_capacity: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            upcoming_horizon_days: DEFAULT_UPCOMING_HORIZON_DAYS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl From<&CareDeskConfig> for WorkflowSettings {
    fn from(config: &CareDeskConfig) -> Self {
        Self {
            upcoming_horizon_days: config.schedule.upcoming_horizon_days,
            ..Self::default()
        }
    }
}

/// Doctor dashboard derived from the current snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub today: Vec<Appointment>,
    pub upcoming: Vec<Appointment>,
    pub summary: AppointmentSummary,
}

/// Wires the appointment book, the collaborators and the coordinator
pub struct WorkflowEngine {
    coordinator: CompletionCoordinator,
    settings: WorkflowSettings,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        prescriptions: Arc<dyn PrescriptionWriter>,
        settings: WorkflowSettings,
    ) -> Self {
        let book = Arc::new(AppointmentBook::new(store));
        let events = EventPublisher::new(settings.event_capacity);

        Self {
            coordinator: CompletionCoordinator::new(book, prescriptions, events),
            settings,
        }
    }

    /// Engine talking to the REST backend named in `config.api`.
    pub fn from_config(config: &CareDeskConfig) -> Result<Self> {
        let client = RestClient::new(&config.api)?;

        info!(base_url = %config.api.base_url, "Workflow engine configured");
        Ok(Self::new(
            Arc::new(RestAppointmentStore::new(client.clone())),
            Arc::new(RestPrescriptionWriter::new(client)),
            WorkflowSettings::from(config),
        ))
    }

    /// Load configuration, install the redacting logger, then build the engine.
    ///
    /// Installs the global subscriber, so call it once per process.
    pub fn bootstrap(config_file: Option<&Path>) -> Result<Self> {
        let mut loader = ConfigEngine::new();
        if let Some(path) = config_file {
            loader = loader.with_file(path);
        }
        let config = loader.load()?;

        logger_redacted::init(&config.logging)?;
        Self::from_config(&config)
    }

    pub fn coordinator(&self) -> &CompletionCoordinator {
        &self.coordinator
    }

    pub fn book(&self) -> &AppointmentBook {
        self.coordinator.book()
    }

    pub fn settings(&self) -> WorkflowSettings {
        self.settings
    }

    /// Replace the snapshot with the doctor's appointments from the store.
    pub async fn load_doctor(&self, doctor_id: &DoctorId) -> Result<Arc<Vec<Appointment>>> {
        Ok(self.book().refresh(doctor_id).await?)
    }

    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Dashboard {
        let snapshot = self.book().snapshot();
        let horizon = self.settings.upcoming_horizon_days;

        Dashboard {
            today: today(snapshot.iter(), now).into_iter().cloned().collect(),
            upcoming: upcoming(snapshot.iter(), now, horizon).into_iter().cloned().collect(),
            summary: summarize(&snapshot, now, horizon),
        }
    }

    /// The appointment table: status filter, then search, most recent first.
    pub fn appointment_list(&self, filter: StatusFilter, search: &str) -> Vec<Appointment> {
        let snapshot = self.book().snapshot();
        let filtered = filter_by_status(snapshot.iter(), filter);
        let matching = filter_by_search(filtered, search);

        sort_by_date_descending(matching).into_iter().cloned().collect()
    }
}
