//! Consultation models.

use serde::{Deserialize, Serialize};

/// A billed medication line inside a consultation.
///
/// `name` and `price` are denormalized copies taken when the consultation is
/// recorded, so later inventory edits or deletions never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationLine {
    /// Inventory item id at the time of the visit
    pub id: String,
    /// Product name snapshot
    pub name: String,
    /// Unit price snapshot
    pub price: f64,
    /// Units dispensed
    pub quantity: i64,
}

impl MedicationLine {
    /// Line subtotal (`quantity * price`).
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// A recorded consultation. Immutable once stored: there is no edit flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    /// Record UUID
    pub id: String,
    /// Owning patient id
    pub patient_id: String,
    /// Visit date (ISO `YYYY-MM-DD`)
    pub date: String,
    /// Reported symptoms
    pub symptoms: String,
    /// Diagnosis
    pub diagnosis: String,
    /// Prescription text
    pub prescription: String,
    /// Fee for the visit itself, excluding medications
    pub consultation_price: f64,
    /// Dispensed medications, in selection order
    pub medications: Vec<MedicationLine>,
    /// `consultation_price` plus the sum of line subtotals
    pub total: f64,
    /// Free-form notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Consultation {
    /// Sum of medication line subtotals.
    pub fn medications_total(&self) -> f64 {
        self.medications.iter().map(|m| m.subtotal()).sum()
    }
}
