//! Consultation composer.
//!
//! Pipeline: load patient + inventory snapshot → staged form fill →
//! medication selection → validated submit (consultation insert + stock
//! decrements, all-or-nothing).

mod draft;
mod validate;

pub use draft::*;
pub use validate::*;

use thiserror::Error;

use crate::db::{Database, DbError};

/// Composer errors.
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("Draft validation failed ({} field(s))", .0.len())]
    Invalid(ErrorMap),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Inventory item no longer exists: {0}")]
    ItemNotFound(String),

    #[error("Insufficient stock for {name}")]
    StockConflict { item_id: String, name: String },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ComposerResult<T> = Result<T, ComposerError>;

/// Coordinates draft creation and submission against the store.
pub struct Composer<'a> {
    db: &'a Database,
}

impl<'a> Composer<'a> {
    /// Create a new composer.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Start a draft for a patient: verifies the patient exists and captures
    /// the current inventory snapshot.
    pub fn begin(&self, patient_id: &str) -> ComposerResult<ConsultationDraft> {
        let patient = self
            .db
            .get_patient(patient_id)?
            .ok_or_else(|| ComposerError::PatientNotFound(patient_id.into()))?;
        let inventory = self.db.list_items()?;
        Ok(ConsultationDraft::new(patient.id, inventory))
    }

    /// Record a draft as a consultation.
    ///
    /// Re-validates every step, verifies the referenced patient and items
    /// still exist, then writes the consultation and its stock decrements in
    /// a single transaction. The stored total is computed from the draft.
    /// Returns the new consultation id.
    pub fn submit(&self, draft: &ConsultationDraft) -> ComposerResult<String> {
        let errors = validate(DraftStep::Review, draft);
        if !errors.is_empty() {
            return Err(ComposerError::Invalid(errors));
        }

        if self.db.get_patient(&draft.patient_id)?.is_none() {
            return Err(ComposerError::PatientNotFound(draft.patient_id.clone()));
        }
        for line in draft.medications() {
            if self.db.get_item(&line.id)?.is_none() {
                return Err(ComposerError::ItemNotFound(line.id.clone()));
            }
        }

        let consultation = draft.to_consultation();
        match self.db.insert_consultation_with_decrements(&consultation) {
            Ok(()) => {
                tracing::info!(
                    consultation_id = %consultation.id,
                    patient_id = %consultation.patient_id,
                    lines = consultation.medications.len(),
                    total = consultation.total,
                    "Consultation recorded"
                );
                Ok(consultation.id)
            }
            Err(DbError::StockConflict(item_id)) => {
                let name = draft
                    .medications()
                    .iter()
                    .find(|m| m.id == item_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| item_id.clone());
                tracing::warn!(item_id = %item_id, "Stock conflict, consultation rolled back");
                Err(ComposerError::StockConflict { item_id, name })
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to record consultation");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InventoryItem, InventoryUpdate, Patient, UserIdentity};

    fn setup() -> (Database, String, String) {
        let db = Database::open_in_memory().unwrap();
        let user = UserIdentity::new("ana@example.com".into());
        db.insert_user(&user).unwrap();
        let patient = Patient::new(
            user.id,
            "ana@example.com".into(),
            "Ana",
            "Lopez",
            "1990-04-12".into(),
            "F".into(),
        );
        db.insert_patient(&patient).unwrap();

        let item = InventoryItem::new("Paracetamol 500mg".into(), 5, 10.0);
        db.insert_item(&item).unwrap();
        (db, patient.id, item.id)
    }

    fn fill_required(draft: &mut ConsultationDraft) {
        draft.date = "2024-03-10".into();
        draft.consultation_price = 50.0;
        draft.symptoms = "Fever and persistent cough".into();
        draft.diagnosis = "Seasonal flu".into();
    }

    #[test]
    fn test_begin_unknown_patient() {
        let (db, _, _) = setup();
        let composer = Composer::new(&db);
        let err = composer.begin("ghost").unwrap_err();
        assert!(matches!(err, ComposerError::PatientNotFound(_)));
    }

    #[test]
    fn test_submit_happy_path() {
        let (db, patient_id, item_id) = setup();
        let composer = Composer::new(&db);

        let mut draft = composer.begin(&patient_id).unwrap();
        fill_required(&mut draft);
        draft.add_medication(&item_id, 2).unwrap();

        let consultation_id = composer.submit(&draft).unwrap();

        let stored = db.get_consultation(&consultation_id).unwrap().unwrap();
        assert_eq!(stored.total, 70.0);
        assert_eq!(db.get_item(&item_id).unwrap().unwrap().quantity, 3);
    }

    #[test]
    fn test_submit_rejects_invalid_draft() {
        let (db, patient_id, _) = setup();
        let composer = Composer::new(&db);

        let mut draft = composer.begin(&patient_id).unwrap();
        fill_required(&mut draft);
        draft.diagnosis = "Flu".into(); // too short

        let err = composer.submit(&draft).unwrap_err();
        match err {
            ComposerError::Invalid(errors) => assert!(errors.contains_key("diagnosis")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_detects_deleted_item() {
        let (db, patient_id, item_id) = setup();
        let composer = Composer::new(&db);

        let mut draft = composer.begin(&patient_id).unwrap();
        fill_required(&mut draft);
        draft.add_medication(&item_id, 1).unwrap();

        // Item disappears between load and submit
        db.delete_item(&item_id).unwrap();

        let err = composer.submit(&draft).unwrap_err();
        assert!(matches!(err, ComposerError::ItemNotFound(id) if id == item_id));
    }

    #[test]
    fn test_submit_stock_conflict() {
        let (db, patient_id, item_id) = setup();
        let composer = Composer::new(&db);

        let mut draft = composer.begin(&patient_id).unwrap();
        fill_required(&mut draft);
        draft.add_medication(&item_id, 4).unwrap();

        // A concurrent edit drains the stock after the snapshot
        db.update_item_fields(
            &item_id,
            &InventoryUpdate {
                quantity: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

        let err = composer.submit(&draft).unwrap_err();
        match err {
            ComposerError::StockConflict { item_id: id, name } => {
                assert_eq!(id, item_id);
                assert_eq!(name, "Paracetamol 500mg");
            }
            other => panic!("expected StockConflict, got {:?}", other),
        }

        // Nothing was written
        assert!(db.list_consultations_for_patient(&patient_id).unwrap().is_empty());
        assert_eq!(db.get_item(&item_id).unwrap().unwrap().quantity, 1);
    }
}
