//! Billing export for accounting hand-off.

use serde::{Deserialize, Serialize};

use super::{ExportError, ExportResult};
use crate::db::Database;
use crate::models::Consultation;

/// Billing export for a single consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingExport {
    /// Export metadata
    pub metadata: BillingMetadata,
    /// Fee line plus one line per dispensed medication
    pub line_items: Vec<BillingLineItem>,
    /// Stored consultation total
    pub total: f64,
}

/// Billing export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingMetadata {
    /// Consultation id for traceability
    pub consultation_id: String,
    /// Patient id
    pub patient_id: String,
    /// Patient name at export time
    pub patient_name: String,
    /// Visit date
    pub date: String,
    /// Export timestamp
    pub exported_at: String,
}

/// Single line item for billing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingLineItem {
    /// Item description
    pub description: String,
    /// Quantity billed
    pub quantity: i64,
    /// Unit price
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub subtotal: f64,
}

impl BillingExport {
    /// Build a billing export from a stored consultation.
    pub fn from_consultation(consultation: &Consultation, patient_name: &str) -> Self {
        let mut line_items = vec![BillingLineItem {
            description: "Consulta médica".into(),
            quantity: 1,
            unit_price: consultation.consultation_price,
            subtotal: consultation.consultation_price,
        }];
        line_items.extend(consultation.medications.iter().map(|m| BillingLineItem {
            description: m.name.clone(),
            quantity: m.quantity,
            unit_price: m.price,
            subtotal: m.subtotal(),
        }));

        Self {
            metadata: BillingMetadata {
                consultation_id: consultation.id.clone(),
                patient_id: consultation.patient_id.clone(),
                patient_name: patient_name.to_string(),
                date: consultation.date.clone(),
                exported_at: chrono::Utc::now().to_rfc3339(),
            },
            line_items,
            total: consultation.total,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        push_csv_lines(&mut csv, self);
        csv
    }
}

/// Batch billing export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchBillingExport {
    /// Export timestamp
    pub exported_at: String,
    /// Individual consultation exports
    pub consultations: Vec<BillingExport>,
    /// Total line item count
    pub total_items: usize,
    /// Sum of consultation totals
    pub grand_total: f64,
}

impl BatchBillingExport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for export in &self.consultations {
            push_csv_lines(&mut csv, export);
        }
        csv
    }
}

const CSV_HEADER: &str =
    "consultation_id,patient_id,patient_name,date,description,quantity,unit_price,subtotal\n";

fn push_csv_lines(csv: &mut String, export: &BillingExport) {
    for item in &export.line_items {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{:.2},{:.2}\n",
            escape_csv(&export.metadata.consultation_id),
            escape_csv(&export.metadata.patient_id),
            escape_csv(&export.metadata.patient_name),
            escape_csv(&export.metadata.date),
            escape_csv(&item.description),
            item.quantity,
            item.unit_price,
            item.subtotal,
        ));
    }
}

/// Billing exporter.
pub struct BillingExporter<'a> {
    db: &'a Database,
}

impl<'a> BillingExporter<'a> {
    /// Create a new billing exporter.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Export billing for one consultation.
    pub fn export_consultation(&self, consultation_id: &str) -> ExportResult<BillingExport> {
        let consultation = self
            .db
            .get_consultation(consultation_id)?
            .ok_or_else(|| ExportError::NotFound(consultation_id.into()))?;
        let patient_name = self
            .db
            .get_patient(&consultation.patient_id)?
            .map(|p| p.name)
            .unwrap_or_default();
        Ok(BillingExport::from_consultation(&consultation, &patient_name))
    }

    /// Export billing for every consultation.
    pub fn export_all(&self) -> ExportResult<BatchBillingExport> {
        self.batch(self.db.list_all_consultations()?)
    }

    /// Export billing for one patient's consultations.
    pub fn export_for_patient(&self, patient_id: &str) -> ExportResult<BatchBillingExport> {
        self.batch(self.db.list_consultations_for_patient(patient_id)?)
    }

    fn batch(&self, consultations: Vec<Consultation>) -> ExportResult<BatchBillingExport> {
        let mut exports = Vec::new();
        let mut total_items = 0;
        let mut grand_total = 0.0;

        for consultation in consultations {
            let patient_name = self
                .db
                .get_patient(&consultation.patient_id)?
                .map(|p| p.name)
                .unwrap_or_default();
            let export = BillingExport::from_consultation(&consultation, &patient_name);
            total_items += export.line_items.len();
            grand_total += export.total;
            exports.push(export);
        }

        Ok(BatchBillingExport {
            exported_at: chrono::Utc::now().to_rfc3339(),
            consultations: exports,
            total_items,
            grand_total,
        })
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
