//! Editable medication list of a completion session

use appointment_service::Medication;
use serde::{Deserialize, Serialize};

pub const COMPLETION_HINT: &str = "Add at least one medication with name, dosage and duration to complete with a prescription.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationField {
    Name,
    Dosage,
    Duration,
    Instructions,
}

impl MedicationField {
    fn slot(self, medication: &mut Medication) -> &mut String {
        match self {
            MedicationField::Name => &mut medication.name,
            MedicationField::Dosage => &mut medication.dosage,
            MedicationField::Duration => &mut medication.duration,
            MedicationField::Instructions => &mut medication.instructions,
        }
    }
}

/// One change to the draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MedicationEdit {
    Add,
    Remove { index: usize },
    Update {
        index: usize,
        field: MedicationField,
        value: String,
    },
}

/// Ordered medication entries, never fewer than one.
///
/// Entries may be partially filled while the doctor types; completeness is
/// derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationDraft {
    entries: Vec<Medication>,
}

impl Default for MedicationDraft {
    fn default() -> Self {
        Self {
            entries: vec![Medication::default()],
        }
    }
}

impl MedicationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Medication] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self) {
        self.entries.push(Medication::default());
    }

    /// Returns false when `index` is out of range or it is the last entry.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    pub fn update(&mut self, index: usize, field: MedicationField, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(medication) => {
                *field.slot(medication) = value.into();
                true
            }
            None => false,
        }
    }

    /// Apply an edit, reporting whether the draft changed shape or content.
    pub fn apply(&mut self, edit: MedicationEdit) -> bool {
        match edit {
            MedicationEdit::Add => {
                self.add();
                true
            }
            MedicationEdit::Remove { index } => self.remove(index),
            MedicationEdit::Update { index, field, value } => self.update(index, field, value),
        }
    }

    pub fn has_complete_medication(&self) -> bool {
        has_complete_medication(&self.entries)
    }

    /// Complete entries, trimmed, in draft order. Incomplete ones are dropped.
    pub fn complete_entries(&self) -> Vec<Medication> {
        self.entries
            .iter()
            .filter(|medication| medication.is_complete())
            .map(Medication::trimmed)
            .collect()
    }

    pub fn completion_hint(&self) -> Option<&'static str> {
        if self.has_complete_medication() {
            None
        } else {
            Some(COMPLETION_HINT)
        }
    }
}

pub fn has_complete_medication(entries: &[Medication]) -> bool {
    entries.iter().any(Medication::is_complete)
}
