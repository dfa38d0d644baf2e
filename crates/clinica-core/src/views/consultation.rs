//! Consultation read-models.

use chrono::NaiveDate;
use serde::Serialize;

use super::{age_on, ViewError, ViewResult};
use crate::db::Database;
use crate::models::Consultation;

/// One card in a patient's history list.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationSummary {
    pub id: String,
    pub date: String,
    /// Human-relative label for the date ("hoy", "hace 3 días", ...)
    pub relative_date: String,
    pub diagnosis: String,
    pub total: f64,
}

/// One medication row in the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationLineView {
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Full consultation detail with derived financial rows.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationDetail {
    pub consultation: Consultation,
    pub patient_name: String,
    pub patient_age: Option<u32>,
    pub lines: Vec<MedicationLineView>,
    pub medications_total: f64,
}

/// Human-relative label for an ISO date. Unparseable input gets the
/// original's fallback text; future dates render as-is.
pub fn relative_day_label(date: &str, today: NaiveDate) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") else {
        return "Fecha inválida".into();
    };
    let days = (today - day).num_days();
    match days {
        d if d < 0 => day.to_string(),
        0 => "hoy".into(),
        1 => "ayer".into(),
        d if d < 30 => format!("hace {} días", d),
        d if d < 365 => format!("hace {} meses", d / 30),
        d => format!("hace {} años", d / 365),
    }
}

/// Read-only access to consultation history.
pub struct HistoryViewer<'a> {
    db: &'a Database,
}

impl<'a> HistoryViewer<'a> {
    /// Create a new viewer.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// A patient's consultation summaries, newest first.
    pub fn history(&self, patient_id: &str) -> ViewResult<Vec<ConsultationSummary>> {
        self.history_on(patient_id, chrono::Utc::now().date_naive())
    }

    /// Same as [`history`](Self::history) with an explicit reference date.
    pub fn history_on(
        &self,
        patient_id: &str,
        today: NaiveDate,
    ) -> ViewResult<Vec<ConsultationSummary>> {
        if self.db.get_patient(patient_id)?.is_none() {
            return Err(ViewError::NotFound(patient_id.into()));
        }
        let consultations = self.db.list_consultations_for_patient(patient_id)?;
        Ok(consultations
            .into_iter()
            .map(|c| summarize(c, today))
            .collect())
    }

    /// Full detail for one consultation.
    pub fn detail(&self, consultation_id: &str) -> ViewResult<ConsultationDetail> {
        self.detail_on(consultation_id, chrono::Utc::now().date_naive())
    }

    /// Same as [`detail`](Self::detail) with an explicit reference date.
    pub fn detail_on(
        &self,
        consultation_id: &str,
        today: NaiveDate,
    ) -> ViewResult<ConsultationDetail> {
        let consultation = self
            .db
            .get_consultation(consultation_id)?
            .ok_or_else(|| ViewError::NotFound(consultation_id.into()))?;
        let patient = self
            .db
            .get_patient(&consultation.patient_id)?
            .ok_or_else(|| ViewError::NotFound(consultation.patient_id.clone()))?;

        let lines: Vec<MedicationLineView> = consultation
            .medications
            .iter()
            .map(|m| MedicationLineView {
                name: m.name.clone(),
                quantity: m.quantity,
                unit_price: m.price,
                subtotal: m.subtotal(),
            })
            .collect();
        let medications_total = consultation.medications_total();

        Ok(ConsultationDetail {
            patient_name: patient.name,
            patient_age: age_on(&patient.birthdate, today),
            lines,
            medications_total,
            consultation,
        })
    }
}

fn summarize(consultation: Consultation, today: NaiveDate) -> ConsultationSummary {
    let diagnosis = if consultation.diagnosis.trim().is_empty() {
        "Sin diagnóstico".into()
    } else {
        consultation.diagnosis
    };
    ConsultationSummary {
        relative_date: relative_day_label(&consultation.date, today),
        id: consultation.id,
        date: consultation.date,
        diagnosis,
        total: consultation.total,
    }
}
