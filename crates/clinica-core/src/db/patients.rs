//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Patient;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        uid: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        birthdate: row.get(4)?,
        sex: row.get(5)?,
        dni: row.get(6)?,
        emergency_number: row.get(7)?,
        direccion: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const PATIENT_COLUMNS: &str = "id, uid, email, name, birthdate, sex, dni, \
                               emergency_number, direccion, created_at, updated_at";

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, uid, email, name, birthdate, sex,
                dni, emergency_number, direccion, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                patient.id,
                patient.uid,
                patient.email,
                patient.name,
                patient.birthdate,
                patient.sex,
                patient.dni,
                patient.emergency_number,
                patient.direccion,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                email = ?2,
                name = ?3,
                birthdate = ?4,
                sex = ?5,
                dni = ?6,
                emergency_number = ?7,
                direccion = ?8,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.email,
                patient.name,
                patient.birthdate,
                patient.sex,
                patient.dni,
                patient.emergency_number,
                patient.direccion,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find the patient linked to a backing identity, if any.
    pub fn find_patient_by_uid(&self, uid: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE uid = ? LIMIT 1", PATIENT_COLUMNS),
                [uid],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find a patient with the given email, excluding one id (for edit-time
    /// uniqueness checks).
    pub fn find_patient_by_email_excluding(
        &self,
        email: &str,
        exclude_id: &str,
    ) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM patients WHERE email = ? AND id != ? LIMIT 1",
                    PATIENT_COLUMNS
                ),
                [email, exclude_id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients, name-ordered.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY name",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search patients by name (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE name LIKE ? ORDER BY name LIMIT ?",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![pattern, limit as i64], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
