//! Patient and backing-identity models.

use serde::{Deserialize, Serialize};

/// A patient record.
///
/// `name` holds the "first last" concatenation the clinic stores; `uid`
/// links back to the identity created for the patient's email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Record UUID
    pub id: String,
    /// Backing user-identity id (one patient per identity, soft-enforced)
    pub uid: String,
    /// Contact email
    pub email: String,
    /// Full name ("first last")
    pub name: String,
    /// Birthdate (ISO `YYYY-MM-DD`)
    pub birthdate: String,
    /// Sex: "M", "F", or "Otro"
    pub sex: String,
    /// National identity number
    pub dni: Option<String>,
    /// Emergency contact phone
    pub emergency_number: Option<String>,
    /// Street address
    pub direccion: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp, set on first edit
    pub updated_at: Option<String>,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(
        uid: String,
        email: String,
        first_name: &str,
        last_name: &str,
        birthdate: String,
        sex: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            uid,
            email,
            name: format!("{} {}", first_name, last_name),
            birthdate,
            sex,
            dni: None,
            emergency_number: None,
            direccion: None,
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
        }
    }

    /// Split the stored full name back into (first, rest).
    pub fn name_parts(&self) -> (&str, &str) {
        match self.name.split_once(' ') {
            Some((first, rest)) => (first, rest),
            None => (self.name.as_str(), ""),
        }
    }
}

/// A backing user identity, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserIdentity {
    /// Identity UUID
    pub id: String,
    /// Email at registration time (kept in sync on patient email edits)
    pub email: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: Option<String>,
}

impl UserIdentity {
    /// Create a new identity for an email.
    pub fn new(email: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient() {
        let patient = Patient::new(
            "uid-1".into(),
            "ana@example.com".into(),
            "Ana",
            "Lopez",
            "1990-04-12".into(),
            "F".into(),
        );
        assert_eq!(patient.name, "Ana Lopez");
        assert_eq!(patient.id.len(), 36); // UUID format
        assert!(patient.updated_at.is_none());
    }

    #[test]
    fn test_name_parts() {
        let mut patient = Patient::new(
            "uid-1".into(),
            "ana@example.com".into(),
            "Ana",
            "Lopez",
            "1990-04-12".into(),
            "F".into(),
        );
        patient.name = "Ana Lopez Garcia".into();
        assert_eq!(patient.name_parts(), ("Ana", "Lopez Garcia"));

        patient.name = "Cher".into();
        assert_eq!(patient.name_parts(), ("Cher", ""));
    }
}
