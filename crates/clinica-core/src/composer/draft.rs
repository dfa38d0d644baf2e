//! In-progress consultation drafts.
//!
//! A draft owns the inventory snapshot captured when the form was opened.
//! Every availability check runs against that snapshot, not live stock; the
//! store settles the difference at submit time.

use std::collections::BTreeMap;

use thiserror::Error;

use super::validate::{validate, DraftStep, ErrorMap};
use crate::models::{Consultation, InventoryItem, MedicationLine};

/// Errors from medication selection.
#[derive(Error, Debug, PartialEq)]
pub enum DraftError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Item not in the loaded inventory: {0}")]
    UnknownItem(String),

    #[error("Insufficient stock: {requested} requested, {available} available")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Medication not selected: {0}")]
    NotSelected(String),
}

/// A consultation being assembled, step by step.
#[derive(Debug, Clone)]
pub struct ConsultationDraft {
    /// Owning patient id
    pub patient_id: String,
    /// Visit date (ISO `YYYY-MM-DD`), defaults to today
    pub date: String,
    /// Fee for the visit itself
    pub consultation_price: f64,
    pub symptoms: String,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: Option<String>,
    /// Selected lines, mutated only through the selection methods
    medications: Vec<MedicationLine>,
    /// Inventory snapshot at load time, keyed by item id
    stock: BTreeMap<String, InventoryItem>,
    step: DraftStep,
}

impl ConsultationDraft {
    /// Create a draft for a patient over an inventory snapshot.
    pub fn new(patient_id: String, inventory: Vec<InventoryItem>) -> Self {
        Self {
            patient_id,
            date: chrono::Utc::now().date_naive().to_string(),
            consultation_price: 0.0,
            symptoms: String::new(),
            diagnosis: String::new(),
            prescription: String::new(),
            notes: None,
            medications: Vec::new(),
            stock: inventory.into_iter().map(|i| (i.id.clone(), i)).collect(),
            step: DraftStep::BasicInfo,
        }
    }

    /// The current form step.
    pub fn step(&self) -> DraftStep {
        self.step
    }

    /// Advance to the next step if the current one validates. On failure the
    /// step does not change and the field errors are returned.
    pub fn advance(&mut self) -> Result<DraftStep, ErrorMap> {
        let errors = validate(self.step, self);
        if !errors.is_empty() {
            return Err(errors);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step. Always allowed, never re-validates.
    pub fn back(&mut self) -> DraftStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// The selected medication lines, in selection order.
    pub fn medications(&self) -> &[MedicationLine] {
        &self.medications
    }

    /// Items from the snapshot, name-ordered, for selection lists.
    pub fn stock_items(&self) -> Vec<&InventoryItem> {
        let mut items: Vec<&InventoryItem> = self.stock.values().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Units of an item already in the draft.
    pub fn selected_quantity(&self, item_id: &str) -> i64 {
        self.medications
            .iter()
            .find(|m| m.id == item_id)
            .map(|m| m.quantity)
            .unwrap_or(0)
    }

    /// Snapshot stock minus what this draft has already claimed. Zero for
    /// unknown items.
    pub fn remaining_quantity(&self, item_id: &str) -> i64 {
        match self.stock.get(item_id) {
            Some(item) => item.quantity - self.selected_quantity(item_id),
            None => 0,
        }
    }

    /// Add `quantity` units of an item. If the item is already selected, its
    /// line is topped up; the combined quantity is bounded by the snapshot
    /// stock, never double-subtracted.
    pub fn add_medication(&mut self, item_id: &str, quantity: i64) -> Result<(), DraftError> {
        if quantity < 1 {
            return Err(DraftError::InvalidQuantity);
        }
        let item = self
            .stock
            .get(item_id)
            .ok_or_else(|| DraftError::UnknownItem(item_id.into()))?;

        let selected = self.selected_quantity(item_id);
        let combined = selected + quantity;
        if combined > item.quantity {
            return Err(DraftError::InsufficientStock {
                requested: quantity,
                available: item.quantity - selected,
            });
        }

        if selected > 0 {
            if let Some(line) = self.medications.iter_mut().find(|m| m.id == item_id) {
                line.quantity = combined;
            }
        } else {
            self.medications.push(MedicationLine {
                id: item.id.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity,
            });
        }
        Ok(())
    }

    /// Drop an item's line entirely, returning its units to "available".
    /// Returns false when the item was not selected.
    pub fn remove_medication(&mut self, item_id: &str) -> bool {
        let before = self.medications.len();
        self.medications.retain(|m| m.id != item_id);
        self.medications.len() < before
    }

    /// Set the quantity of an already-selected line. The bound is the total
    /// snapshot stock: with one line per item there is nothing else to
    /// subtract.
    pub fn update_medication_quantity(
        &mut self,
        item_id: &str,
        quantity: i64,
    ) -> Result<(), DraftError> {
        if quantity < 1 {
            return Err(DraftError::InvalidQuantity);
        }
        let stock_quantity = self
            .stock
            .get(item_id)
            .map(|i| i.quantity)
            .ok_or_else(|| DraftError::UnknownItem(item_id.into()))?;
        if quantity > stock_quantity {
            return Err(DraftError::InsufficientStock {
                requested: quantity,
                available: stock_quantity,
            });
        }
        let line = self
            .medications
            .iter_mut()
            .find(|m| m.id == item_id)
            .ok_or_else(|| DraftError::NotSelected(item_id.into()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Sum of line subtotals.
    pub fn medications_total(&self) -> f64 {
        self.medications.iter().map(|m| m.subtotal()).sum()
    }

    /// Consultation fee plus medications.
    pub fn grand_total(&self) -> f64 {
        self.consultation_price + self.medications_total()
    }

    /// Freeze the draft into a storable consultation. The total is computed
    /// here, not taken from the caller.
    pub fn to_consultation(&self) -> Consultation {
        Consultation {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: self.patient_id.clone(),
            date: self.date.trim().to_string(),
            symptoms: self.symptoms.clone(),
            diagnosis: self.diagnosis.clone(),
            prescription: self.prescription.clone(),
            consultation_price: self.consultation_price,
            medications: self.medications.clone(),
            total: self.grand_total(),
            notes: self.notes.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
