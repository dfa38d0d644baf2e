//! Draft validation rules.
//!
//! One pure function, called identically by step advancement and final
//! submission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::draft::ConsultationDraft;

/// Ordered steps of the consultation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DraftStep {
    /// Date and consultation fee
    BasicInfo,
    /// Symptoms, diagnosis, prescription
    MedicalInfo,
    /// Optional medication line items
    Medications,
    /// Read-back before submission
    Review,
}

impl DraftStep {
    /// The step after this one, if any.
    pub fn next(self) -> Option<DraftStep> {
        match self {
            DraftStep::BasicInfo => Some(DraftStep::MedicalInfo),
            DraftStep::MedicalInfo => Some(DraftStep::Medications),
            DraftStep::Medications => Some(DraftStep::Review),
            DraftStep::Review => None,
        }
    }

    /// The step before this one, if any.
    pub fn prev(self) -> Option<DraftStep> {
        match self {
            DraftStep::BasicInfo => None,
            DraftStep::MedicalInfo => Some(DraftStep::BasicInfo),
            DraftStep::Medications => Some(DraftStep::MedicalInfo),
            DraftStep::Review => Some(DraftStep::Medications),
        }
    }
}

/// Field name → user-facing message.
pub type ErrorMap = BTreeMap<&'static str, String>;

const MIN_SYMPTOMS_LEN: usize = 10;
const MIN_DIAGNOSIS_LEN: usize = 5;

/// Validate a draft against the rules of one step.
///
/// `Review` applies every step's rules. The medications step has no required
/// fields: a consultation without dispensed medication is valid.
pub fn validate(step: DraftStep, draft: &ConsultationDraft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    match step {
        DraftStep::BasicInfo => {
            if draft.date.trim().is_empty() {
                errors.insert("date", "La fecha es obligatoria".into());
            } else if chrono::NaiveDate::parse_from_str(draft.date.trim(), "%Y-%m-%d").is_err() {
                errors.insert("date", "Formato de fecha inválido".into());
            }
            if !(draft.consultation_price > 0.0) || !draft.consultation_price.is_finite() {
                errors.insert(
                    "consultation_price",
                    "El precio debe ser mayor que cero".into(),
                );
            }
        }
        DraftStep::MedicalInfo => {
            if draft.symptoms.trim().chars().count() < MIN_SYMPTOMS_LEN {
                errors.insert(
                    "symptoms",
                    format!("Mínimo {} caracteres", MIN_SYMPTOMS_LEN),
                );
            }
            if draft.diagnosis.trim().chars().count() < MIN_DIAGNOSIS_LEN {
                errors.insert(
                    "diagnosis",
                    format!("Mínimo {} caracteres", MIN_DIAGNOSIS_LEN),
                );
            }
        }
        DraftStep::Medications => {}
        DraftStep::Review => {
            errors.extend(validate(DraftStep::BasicInfo, draft));
            errors.extend(validate(DraftStep::MedicalInfo, draft));
            errors.extend(validate(DraftStep::Medications, draft));
        }
    }
    errors
}
