//! Consultation database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Consultation, MedicationLine};

impl Database {
    /// Insert a consultation and decrement the stock of every billed
    /// medication in one transaction.
    ///
    /// Each decrement is conditional on enough stock remaining
    /// (`quantity >= n`), so a concurrent submission that drained an item
    /// rolls the whole write back with [`DbError::StockConflict`]. Either the
    /// consultation and all its stock effects land together, or nothing does.
    pub fn insert_consultation_with_decrements(
        &self,
        consultation: &Consultation,
    ) -> DbResult<()> {
        let medications_json = serde_json::to_string(&consultation.medications)?;

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO consultations (
                id, patient_id, date, symptoms, diagnosis, prescription,
                consultation_price, medications, total, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                consultation.id,
                consultation.patient_id,
                consultation.date,
                consultation.symptoms,
                consultation.diagnosis,
                consultation.prescription,
                consultation.consultation_price,
                medications_json,
                consultation.total,
                consultation.notes,
                consultation.created_at,
            ],
        )?;

        for line in &consultation.medications {
            let rows_affected = tx.execute(
                r#"
                UPDATE inventory
                SET quantity = quantity - ?1, updated_at = datetime('now')
                WHERE id = ?2 AND quantity >= ?1
                "#,
                params![line.quantity, line.id],
            )?;
            if rows_affected == 0 {
                // Dropping the transaction rolls back the insert and any
                // decrements already applied.
                return Err(DbError::StockConflict(line.id.clone()));
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a consultation by id.
    pub fn get_consultation(&self, id: &str) -> DbResult<Option<Consultation>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, date, symptoms, diagnosis, prescription,
                       consultation_price, medications, total, notes, created_at
                FROM consultations
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(ConsultationRow {
                        id: row.get(0)?,
                        patient_id: row.get(1)?,
                        date: row.get(2)?,
                        symptoms: row.get(3)?,
                        diagnosis: row.get(4)?,
                        prescription: row.get(5)?,
                        consultation_price: row.get(6)?,
                        medications: row.get(7)?,
                        total: row.get(8)?,
                        notes: row.get(9)?,
                        created_at: row.get(10)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List a patient's consultations, newest first.
    pub fn list_consultations_for_patient(
        &self,
        patient_id: &str,
    ) -> DbResult<Vec<Consultation>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, date, symptoms, diagnosis, prescription,
                   consultation_price, medications, total, notes, created_at
            FROM consultations
            WHERE patient_id = ?
            ORDER BY date DESC, created_at DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(ConsultationRow {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                date: row.get(2)?,
                symptoms: row.get(3)?,
                diagnosis: row.get(4)?,
                prescription: row.get(5)?,
                consultation_price: row.get(6)?,
                medications: row.get(7)?,
                total: row.get(8)?,
                notes: row.get(9)?,
                created_at: row.get(10)?,
            })
        })?;

        let mut consultations = Vec::new();
        for row in rows {
            consultations.push(row?.try_into()?);
        }
        Ok(consultations)
    }

    /// List every consultation, newest first (export surface).
    pub fn list_all_consultations(&self) -> DbResult<Vec<Consultation>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, date, symptoms, diagnosis, prescription,
                   consultation_price, medications, total, notes, created_at
            FROM consultations
            ORDER BY date DESC, created_at DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ConsultationRow {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                date: row.get(2)?,
                symptoms: row.get(3)?,
                diagnosis: row.get(4)?,
                prescription: row.get(5)?,
                consultation_price: row.get(6)?,
                medications: row.get(7)?,
                total: row.get(8)?,
                notes: row.get(9)?,
                created_at: row.get(10)?,
            })
        })?;

        let mut consultations = Vec::new();
        for row in rows {
            consultations.push(row?.try_into()?);
        }
        Ok(consultations)
    }
}

/// Intermediate row struct for database mapping.
struct ConsultationRow {
    id: String,
    patient_id: String,
    date: String,
    symptoms: String,
    diagnosis: String,
    prescription: String,
    consultation_price: f64,
    medications: String,
    total: f64,
    notes: Option<String>,
    created_at: String,
}

impl TryFrom<ConsultationRow> for Consultation {
    type Error = DbError;

    fn try_from(row: ConsultationRow) -> Result<Self, Self::Error> {
        let medications: Vec<MedicationLine> = serde_json::from_str(&row.medications)?;
        Ok(Consultation {
            id: row.id,
            patient_id: row.patient_id,
            date: row.date,
            symptoms: row.symptoms,
            diagnosis: row.diagnosis,
            prescription: row.prescription,
            consultation_price: row.consultation_price,
            medications,
            total: row.total,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}
