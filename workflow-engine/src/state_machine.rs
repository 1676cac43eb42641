//! Actions a doctor can take on an appointment and when each is enabled

use appointment_service::AppointmentStatus;
use serde::{Deserialize, Serialize};

use crate::draft::MedicationDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    CompleteWithPrescription,
    CompleteWithoutPrescription,
    Cancel,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 3] = [
        WorkflowAction::CompleteWithPrescription,
        WorkflowAction::CompleteWithoutPrescription,
        WorkflowAction::Cancel,
    ];

    pub fn target_status(self) -> AppointmentStatus {
        match self {
            WorkflowAction::CompleteWithPrescription | WorkflowAction::CompleteWithoutPrescription => {
                AppointmentStatus::Completed
            }
            WorkflowAction::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// Actions whose transition is legal from `status`. Empty for terminal states.
    pub fn available_for(status: AppointmentStatus) -> Vec<WorkflowAction> {
        Self::ALL
            .into_iter()
            .filter(|action| status.can_transition_to(action.target_status()))
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkflowAction::CompleteWithPrescription => "Complete with prescription",
            WorkflowAction::CompleteWithoutPrescription => "Complete without prescription",
            WorkflowAction::Cancel => "Cancel appointment",
        }
    }
}

/// Button state of one action in the completion dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub action: WorkflowAction,
    pub enabled: bool,
    pub hint: Option<&'static str>,
}

/// States of every action that is legal from `status`, given the current draft.
pub fn action_states(status: AppointmentStatus, draft: &MedicationDraft) -> Vec<ActionState> {
    WorkflowAction::available_for(status)
        .into_iter()
        .map(|action| match action {
            WorkflowAction::CompleteWithPrescription => ActionState {
                action,
                enabled: draft.has_complete_medication(),
                hint: draft.completion_hint(),
            },
            _ => ActionState {
                action,
                enabled: true,
                hint: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::MedicationField;

    #[test]
    fn test_targets() {
        assert_eq!(WorkflowAction::CompleteWithPrescription.target_status(), AppointmentStatus::Completed);
        assert_eq!(WorkflowAction::CompleteWithoutPrescription.target_status(), AppointmentStatus::Completed);
        assert_eq!(WorkflowAction::Cancel.target_status(), AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states_offer_nothing() {
        assert_eq!(WorkflowAction::available_for(AppointmentStatus::Booked).len(), 3);
        assert!(WorkflowAction::available_for(AppointmentStatus::Completed).is_empty());
        assert!(WorkflowAction::available_for(AppointmentStatus::Cancelled).is_empty());
    }

    #[test]
    fn test_prescription_action_follows_draft() {
        let mut draft = MedicationDraft::new();
        let states = action_states(AppointmentStatus::Booked, &draft);
        let with_prescription = &states[0];
        assert_eq!(with_prescription.action, WorkflowAction::CompleteWithPrescription);
        assert!(!with_prescription.enabled);
        assert!(with_prescription.hint.is_some());
        assert!(states[1..].iter().all(|state| state.enabled));

        draft.update(0, MedicationField::Name, "Paracetamol");
        draft.update(0, MedicationField::Dosage, "500mg");
        draft.update(0, MedicationField::Duration, "5 days");

        let states = action_states(AppointmentStatus::Booked, &draft);
        assert!(states[0].enabled);
        assert_eq!(states[0].hint, None);
    }
}
