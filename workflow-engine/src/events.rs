//! Workflow notifications for the display surface

use appointment_service::{Affordance, AppointmentId, PrescriptionId};
use chrono::{DateTime, Utc};
use error_common::ErrorReport;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    WorkflowOpened {
        appointment_id: AppointmentId,
        /// Absent when the appointment opened read-only
        session_id: Option<Uuid>,
        affordance: Affordance,
    },
    MedicationsChanged {
        appointment_id: AppointmentId,
        session_id: Uuid,
        entries: usize,
        can_complete_with_prescription: bool,
    },
    CompletionSucceeded {
        appointment_id: AppointmentId,
        prescription_id: Option<PrescriptionId>,
    },
    CompletionFailed {
        appointment_id: AppointmentId,
        error: ErrorReport,
    },
    CancellationSucceeded {
        appointment_id: AppointmentId,
    },
    CancellationFailed {
        appointment_id: AppointmentId,
        error: ErrorReport,
    },
}

impl WorkflowEvent {
    pub fn appointment_id(&self) -> &AppointmentId {
        match self {
            WorkflowEvent::WorkflowOpened { appointment_id, .. }
            | WorkflowEvent::MedicationsChanged { appointment_id, .. }
            | WorkflowEvent::CompletionSucceeded { appointment_id, .. }
            | WorkflowEvent::CompletionFailed { appointment_id, .. }
            | WorkflowEvent::CancellationSucceeded { appointment_id }
            | WorkflowEvent::CancellationFailed { appointment_id, .. } => appointment_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: WorkflowEvent,
}

/// Broadcast channel for [`WorkflowEvent`]s
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<EventEnvelope>,
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: WorkflowEvent) {
        let envelope = EventEnvelope {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        };

        // A send only fails when nobody is listening.
        if self.sender.send(envelope).is_err() {
            debug!("Workflow event dropped, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        EventPublisher::default().publish(WorkflowEvent::CancellationSucceeded {
            appointment_id: AppointmentId::new("apt-1"),
        });
    }

    #[tokio::test]
    async fn test_subscribers_receive_enveloped_events() {
        let publisher = EventPublisher::new(8);
        let mut receiver = publisher.subscribe();

        publisher.publish(WorkflowEvent::CompletionSucceeded {
            appointment_id: AppointmentId::new("apt-1"),
            prescription_id: Some(PrescriptionId::new("rx-1")),
        });

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.event.appointment_id().as_str(), "apt-1");
        assert!(matches!(
            envelope.event,
            WorkflowEvent::CompletionSucceeded { prescription_id: Some(_), .. }
        ));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let value = serde_json::to_value(WorkflowEvent::WorkflowOpened {
            appointment_id: AppointmentId::new("apt-1"),
            session_id: None,
            affordance: Affordance::ViewDetails,
        })
        .unwrap();

        assert_eq!(value["type"], "workflow_opened");
        assert_eq!(value["appointment_id"], "apt-1");
        assert_eq!(value["affordance"], "view_details");
    }
}
