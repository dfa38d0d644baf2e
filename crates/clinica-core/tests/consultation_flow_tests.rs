//! End-to-end tests for the consultation flow and its neighbors.

use anyhow::Result;

use clinica_core::composer::{Composer, ComposerError, DraftError};
use clinica_core::db::Database;
use clinica_core::inventory::InventoryService;
use clinica_core::registry::{PatientInput, PatientRegistry, RegistryError};

fn patient_input(email: &str, first: &str, last: &str) -> PatientInput {
    PatientInput {
        email: email.into(),
        first_name: first.into(),
        last_name: last.into(),
        birthdate: "1990-04-12".into(),
        sex: "F".into(),
        ..Default::default()
    }
}

#[test]
fn recorded_consultation_totals_and_decrements() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);
    let inventory = InventoryService::new(&db);
    let composer = Composer::new(&db);

    let patient = registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;
    let item = inventory.create_item("Ibuprofeno 400mg", 8, 10.0)?;

    let mut draft = composer.begin(&patient.id)?;
    draft.date = "2024-03-10".into();
    draft.consultation_price = 50.0;
    draft.symptoms = "Headache for three days".into();
    draft.diagnosis = "Tension headache".into();
    draft.add_medication(&item.id, 2)?;

    let consultation_id = composer.submit(&draft)?;

    // Stored total is fee + 2 * 10
    let stored = db.get_consultation(&consultation_id)?.unwrap();
    assert_eq!(stored.total, 70.0);
    assert_eq!(stored.consultation_price, 50.0);
    assert_eq!(stored.medications.len(), 1);
    assert_eq!(stored.medications[0].quantity, 2);

    // Exactly one decrement of 2 against the pre-submit stock
    let remaining = inventory.get_item(&item.id)?;
    assert_eq!(remaining.quantity, 6);
    Ok(())
}

#[test]
fn selection_is_bounded_by_snapshot_stock() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);
    let inventory = InventoryService::new(&db);
    let composer = Composer::new(&db);

    let patient = registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;
    let med1 = inventory.create_item("Paracetamol 500mg", 5, 20.0)?;

    let mut draft = composer.begin(&patient.id)?;
    draft.add_medication(&med1.id, 3)?;
    assert_eq!(draft.medications_total(), 60.0);

    // 3 + 2 = 5 is allowed; 3 + 3 = 6 would exceed the stock of 5
    draft.add_medication(&med1.id, 2)?;
    assert_eq!(draft.medications_total(), 100.0);

    draft.remove_medication(&med1.id);
    draft.add_medication(&med1.id, 3)?;
    let err = draft.add_medication(&med1.id, 3).unwrap_err();
    assert_eq!(
        err,
        DraftError::InsufficientStock {
            requested: 3,
            available: 2
        }
    );
    Ok(())
}

#[test]
fn consultation_without_medications_decrements_nothing() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);
    let inventory = InventoryService::new(&db);
    let composer = Composer::new(&db);

    let patient = registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;
    let item = inventory.create_item("Paracetamol 500mg", 5, 20.0)?;

    let mut draft = composer.begin(&patient.id)?;
    draft.date = "2024-03-10".into();
    draft.consultation_price = 35.0;
    draft.symptoms = "Routine yearly check-up".into();
    draft.diagnosis = "Healthy".into();

    let consultation_id = composer.submit(&draft)?;

    let stored = db.get_consultation(&consultation_id)?.unwrap();
    assert_eq!(stored.total, 35.0);
    assert!(stored.medications.is_empty());
    assert_eq!(inventory.get_item(&item.id)?.quantity, 5);
    Ok(())
}

#[test]
fn failed_submit_leaves_no_partial_state() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);
    let inventory = InventoryService::new(&db);
    let composer = Composer::new(&db);

    let patient = registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;
    let plenty = inventory.create_item("Paracetamol 500mg", 10, 1.5)?;
    let scarce = inventory.create_item("Amoxicilina 500mg", 3, 4.0)?;

    let mut draft = composer.begin(&patient.id)?;
    draft.date = "2024-03-10".into();
    draft.consultation_price = 50.0;
    draft.symptoms = "Fever and persistent cough".into();
    draft.diagnosis = "Bacterial infection".into();
    draft.add_medication(&plenty.id, 4)?;
    draft.add_medication(&scarce.id, 3)?;

    // Another submission drains the scarce item between snapshot and submit
    let mut other = composer.begin(&patient.id)?;
    other.date = "2024-03-10".into();
    other.consultation_price = 40.0;
    other.symptoms = "Sore throat since monday".into();
    other.diagnosis = "Tonsillitis".into();
    other.add_medication(&scarce.id, 2)?;
    composer.submit(&other)?;

    let err = composer.submit(&draft).unwrap_err();
    assert!(matches!(err, ComposerError::StockConflict { .. }));

    // The losing submission wrote nothing at all
    assert_eq!(db.list_consultations_for_patient(&patient.id)?.len(), 1);
    assert_eq!(inventory.get_item(&plenty.id)?.quantity, 10);
    assert_eq!(inventory.get_item(&scarce.id)?.quantity, 1);
    Ok(())
}

#[test]
fn invalid_registration_writes_nothing() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);

    let err = registry
        .create_patient(&patient_input("not-an-email", "Ana", "Lopez"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::Invalid(_)));

    assert!(db.find_user_by_email("not-an-email")?.is_none());
    assert!(db.list_patients()?.is_empty());
    Ok(())
}

#[test]
fn email_conflict_on_edit_mutates_nothing() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);

    registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;
    let berta = registry.create_patient(&patient_input("berta@example.com", "Berta", "Mena"))?;

    let err = registry
        .update_patient(&berta.id, &patient_input("ana@example.com", "Berta", "Mena"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::EmailInUse(_)));

    let unchanged = registry.get_patient(&berta.id)?;
    assert_eq!(unchanged.email, "berta@example.com");
    assert!(unchanged.updated_at.is_none());
    Ok(())
}

#[test]
fn refetch_returns_identical_records() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);
    let composer = Composer::new(&db);

    let patient = registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;

    let mut draft = composer.begin(&patient.id)?;
    draft.date = "2024-03-10".into();
    draft.consultation_price = 50.0;
    draft.symptoms = "Fever and persistent cough".into();
    draft.diagnosis = "Seasonal flu".into();
    let consultation_id = composer.submit(&draft)?;

    let p1 = registry.get_patient(&patient.id)?;
    let p2 = registry.get_patient(&patient.id)?;
    assert_eq!(p1, p2);

    let c1 = db.get_consultation(&consultation_id)?.unwrap();
    let c2 = db.get_consultation(&consultation_id)?.unwrap();
    assert_eq!(c1, c2);
    Ok(())
}

#[test]
fn deleting_an_item_keeps_history_readable() -> Result<()> {
    let db = Database::open_in_memory()?;
    let registry = PatientRegistry::new(&db);
    let inventory = InventoryService::new(&db);
    let composer = Composer::new(&db);

    let patient = registry.create_patient(&patient_input("ana@example.com", "Ana", "Lopez"))?;
    let item = inventory.create_item("Jarabe para la tos", 4, 6.5)?;

    let mut draft = composer.begin(&patient.id)?;
    draft.date = "2024-03-10".into();
    draft.consultation_price = 50.0;
    draft.symptoms = "Persistent dry cough".into();
    draft.diagnosis = "Bronchitis".into();
    draft.add_medication(&item.id, 1)?;
    let consultation_id = composer.submit(&draft)?;

    // Product retired afterwards; the snapshot in the consultation survives
    inventory.delete_item(&item.id)?;

    let stored = db.get_consultation(&consultation_id)?.unwrap();
    assert_eq!(stored.medications[0].name, "Jarabe para la tos");
    assert_eq!(stored.medications[0].price, 6.5);
    Ok(())
}
