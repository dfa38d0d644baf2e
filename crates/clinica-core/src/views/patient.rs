//! Patient read-model.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{ViewError, ViewResult};
use crate::db::Database;
use crate::models::Patient;

/// A patient with display-only derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct PatientProfile {
    pub patient: Patient,
    /// Whole years since birthdate, None when the birthdate does not parse
    pub age: Option<u32>,
}

/// Completed years between `birthdate` (ISO `YYYY-MM-DD`) and `today`,
/// borrowing a year when the birthday has not yet come around.
pub fn age_on(birthdate: &str, today: NaiveDate) -> Option<u32> {
    let birth = NaiveDate::parse_from_str(birthdate.trim(), "%Y-%m-%d").ok()?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Read-only access to patient profiles.
pub struct PatientViewer<'a> {
    db: &'a Database,
}

impl<'a> PatientViewer<'a> {
    /// Create a new viewer.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// A patient with derived age, as of today.
    pub fn profile(&self, patient_id: &str) -> ViewResult<PatientProfile> {
        self.profile_on(patient_id, chrono::Utc::now().date_naive())
    }

    /// Same as [`profile`](Self::profile) with an explicit reference date.
    pub fn profile_on(&self, patient_id: &str, today: NaiveDate) -> ViewResult<PatientProfile> {
        let patient = self
            .db
            .get_patient(patient_id)?
            .ok_or_else(|| ViewError::NotFound(patient_id.into()))?;
        let age = age_on(&patient.birthdate, today);
        Ok(PatientProfile { patient, age })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserIdentity;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        // Birthday not yet reached this year
        assert_eq!(age_on("1990-06-15", date("2024-06-14")), Some(33));
        // On the birthday
        assert_eq!(age_on("1990-06-15", date("2024-06-15")), Some(34));
        // After
        assert_eq!(age_on("1990-06-15", date("2024-12-01")), Some(34));
    }

    #[test]
    fn test_age_unparseable_or_future() {
        assert_eq!(age_on("", date("2024-06-15")), None);
        assert_eq!(age_on("15/06/1990", date("2024-06-15")), None);
        // Born "tomorrow": negative age has no display value
        assert_eq!(age_on("2024-06-16", date("2024-06-15")), None);
    }

    #[test]
    fn test_profile() {
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

        let viewer = PatientViewer::new(&db);
        let profile = viewer.profile_on(&patient.id, date("2024-04-12")).unwrap();
        assert_eq!(profile.age, Some(34));

        assert!(matches!(
            viewer.profile("ghost"),
            Err(ViewError::NotFound(_))
        ));
    }
}
