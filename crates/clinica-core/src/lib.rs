//! Clinica Core Library
//!
//! Storage and services for a small clinic: patient records, consultation
//! history, and the pharmacy inventory billed during consultations.
//!
//! # Architecture
//!
//! ```text
//!                       ┌─────────────────────────┐
//!                       │       ClinicaCore       │  facade, one lock
//!                       └────────────┬────────────┘
//!          ┌───────────────┬────────┼────────┬───────────────┐
//!          ▼               ▼        ▼        ▼               ▼
//!     PatientRegistry  Inventory  Composer  Viewers     BillingExporter
//!          │            Service      │        │               │
//!          └───────────────┴────────┬┴────────┴───────────────┘
//!                                   ▼
//!                              Database (SQLite)
//!            users · patients · inventory · consultations
//! ```
//!
//! # Core flow
//!
//! A consultation is assembled in a [`composer::ConsultationDraft`] against an
//! inventory snapshot, validated step by step, and recorded by
//! [`composer::Composer::submit`]: one transaction inserts the consultation
//! and conditionally decrements the stock of every billed medication, so the
//! record and its stock effects land together or not at all.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer with FTS5 product search
//! - [`models`]: Domain types (Patient, InventoryItem, Consultation, etc.)
//! - [`composer`]: Draft state machine, validation, and submission
//! - [`registry`]: Patient registration and demographic edits
//! - [`inventory`]: Validated inventory CRUD and search
//! - [`views`]: Read-only projections (history, detail, profile)
//! - [`export`]: Billing export (JSON/CSV)

pub mod composer;
pub mod db;
pub mod export;
pub mod inventory;
pub mod models;
pub mod registry;
pub mod views;

// Re-export commonly used types
pub use composer::{Composer, ComposerError, ConsultationDraft, DraftError, DraftStep, ErrorMap};
pub use db::Database;
pub use export::{BatchBillingExport, BillingExport, BillingExporter};
pub use inventory::{InventoryError, InventoryService};
pub use models::{Consultation, InventoryItem, InventoryUpdate, MedicationLine, Patient, UserIdentity};
pub use registry::{PatientInput, PatientRegistry, RegistryError};
pub use views::{ConsultationDetail, ConsultationSummary, HistoryViewer, PatientProfile, PatientViewer};

use std::sync::{Arc, Mutex};

// =========================================================================
// Facade Error Type
// =========================================================================

/// Aggregate error for the facade surface.
#[derive(Debug, thiserror::Error)]
pub enum ClinicaError {
    #[error(transparent)]
    Database(#[from] db::DbError),

    #[error(transparent)]
    Composer(#[from] composer::ComposerError),

    #[error(transparent)]
    Registry(#[from] registry::RegistryError),

    #[error(transparent)]
    Inventory(#[from] inventory::InventoryError),

    #[error(transparent)]
    View(#[from] views::ViewError),

    #[error(transparent)]
    Export(#[from] export::ExportError),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for ClinicaError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicaError::Poisoned(e.to_string())
    }
}

pub type ClinicaResult<T> = Result<T, ClinicaError>;

// =========================================================================
// Factory Functions
// =========================================================================

/// Open or create a clinic database at the given path.
pub fn open(path: &str) -> ClinicaResult<Arc<ClinicaCore>> {
    let db = Database::open(path)?;
    Ok(Arc::new(ClinicaCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory clinic database (for testing).
pub fn open_in_memory() -> ClinicaResult<Arc<ClinicaCore>> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicaCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe application facade over the clinic store.
pub struct ClinicaCore {
    db: Arc<Mutex<Database>>,
}

impl ClinicaCore {
    // =====================================================================
    // Inventory Operations
    // =====================================================================

    /// Add a product to the inventory.
    pub fn create_inventory_item(
        &self,
        name: &str,
        quantity: i64,
        price: f64,
    ) -> ClinicaResult<InventoryItem> {
        let db = self.db.lock()?;
        Ok(InventoryService::new(&db).create_item(name, quantity, price)?)
    }

    /// Merge a partial update into a product.
    pub fn update_inventory_item(
        &self,
        id: &str,
        update: &InventoryUpdate,
    ) -> ClinicaResult<InventoryItem> {
        let db = self.db.lock()?;
        Ok(InventoryService::new(&db).update_item(id, update)?)
    }

    /// Remove a product.
    pub fn delete_inventory_item(&self, id: &str) -> ClinicaResult<()> {
        let db = self.db.lock()?;
        Ok(InventoryService::new(&db).delete_item(id)?)
    }

    /// Full inventory snapshot.
    pub fn list_inventory(&self) -> ClinicaResult<Vec<InventoryItem>> {
        let db = self.db.lock()?;
        Ok(InventoryService::new(&db).list_items()?)
    }

    /// Search products by name.
    pub fn search_inventory(&self, query: &str, limit: u32) -> ClinicaResult<Vec<InventoryItem>> {
        let db = self.db.lock()?;
        Ok(InventoryService::new(&db).search_items(query, limit as usize)?)
    }

    // =====================================================================
    // Patient Operations
    // =====================================================================

    /// Register a new patient.
    pub fn register_patient(&self, input: &PatientInput) -> ClinicaResult<Patient> {
        let db = self.db.lock()?;
        Ok(PatientRegistry::new(&db).create_patient(input)?)
    }

    /// Update a patient's demographics.
    pub fn update_patient(&self, id: &str, input: &PatientInput) -> ClinicaResult<Patient> {
        let db = self.db.lock()?;
        Ok(PatientRegistry::new(&db).update_patient(id, input)?)
    }

    /// Fetch a patient by id.
    pub fn get_patient(&self, id: &str) -> ClinicaResult<Patient> {
        let db = self.db.lock()?;
        Ok(PatientRegistry::new(&db).get_patient(id)?)
    }

    /// List all patients.
    pub fn list_patients(&self) -> ClinicaResult<Vec<Patient>> {
        let db = self.db.lock()?;
        Ok(PatientRegistry::new(&db).list_patients()?)
    }

    /// Search patients by name prefix.
    pub fn search_patients(&self, query: &str, limit: u32) -> ClinicaResult<Vec<Patient>> {
        let db = self.db.lock()?;
        Ok(PatientRegistry::new(&db).search_patients(query, limit as usize)?)
    }

    /// A patient with derived display fields.
    pub fn patient_profile(&self, id: &str) -> ClinicaResult<PatientProfile> {
        let db = self.db.lock()?;
        Ok(PatientViewer::new(&db).profile(id)?)
    }

    // =====================================================================
    // Consultation Operations
    // =====================================================================

    /// Start a consultation draft for a patient.
    pub fn begin_consultation(&self, patient_id: &str) -> ClinicaResult<ConsultationDraft> {
        let db = self.db.lock()?;
        Ok(Composer::new(&db).begin(patient_id)?)
    }

    /// Record a draft: all-or-nothing insert plus stock decrements. Returns
    /// the new consultation id.
    pub fn record_consultation(&self, draft: &ConsultationDraft) -> ClinicaResult<String> {
        let db = self.db.lock()?;
        Ok(Composer::new(&db).submit(draft)?)
    }

    /// A patient's consultation summaries, newest first.
    pub fn consultation_history(&self, patient_id: &str) -> ClinicaResult<Vec<ConsultationSummary>> {
        let db = self.db.lock()?;
        Ok(HistoryViewer::new(&db).history(patient_id)?)
    }

    /// Full detail for one consultation.
    pub fn consultation_detail(&self, consultation_id: &str) -> ClinicaResult<ConsultationDetail> {
        let db = self.db.lock()?;
        Ok(HistoryViewer::new(&db).detail(consultation_id)?)
    }

    // =====================================================================
    // Export Operations
    // =====================================================================

    /// Export all billing data as JSON.
    pub fn export_billing_json(&self) -> ClinicaResult<String> {
        let db = self.db.lock()?;
        let batch = BillingExporter::new(&db).export_all()?;
        Ok(batch.to_json().map_err(export::ExportError::Json)?)
    }

    /// Export all billing data as CSV.
    pub fn export_billing_csv(&self) -> ClinicaResult<String> {
        let db = self.db.lock()?;
        let batch = BillingExporter::new(&db).export_all()?;
        Ok(batch.to_csv())
    }

    /// Billing data for one patient.
    pub fn billing_for_patient(&self, patient_id: &str) -> ClinicaResult<BatchBillingExport> {
        let db = self.db.lock()?;
        Ok(BillingExporter::new(&db).export_for_patient(patient_id)?)
    }
}
