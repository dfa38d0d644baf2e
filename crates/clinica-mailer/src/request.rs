//! Email request/response wire types.
//!
//! The request body is `{"type": ..., "data": ...}` with the payload shape
//! depending on the type. Field names follow the wire contract (camelCase).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mailer errors.
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type MailerResult<T> = Result<T, MailerError>;

/// Patient fields shared by every message kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientEmailData {
    pub patient_name: String,
    pub patient_email: String,
    pub birthdate: String,
    pub sex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

/// Appointment payload for confirmations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentData {
    pub date: String,
    pub time: String,
    pub consultation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One medication row in a consultation summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationSummary {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Consultation payload for saved-visit summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationData {
    pub date: String,
    pub symptoms: String,
    pub diagnosis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    pub consultation_price: f64,
    #[serde(default)]
    pub medications: Vec<MedicationSummary>,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A typed email request, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EmailRequest {
    PatientWelcome(PatientEmailData),
    AppointmentConfirmation {
        #[serde(rename = "patientData")]
        patient_data: PatientEmailData,
        #[serde(rename = "appointmentData")]
        appointment_data: AppointmentData,
    },
    ConsultationSaved {
        #[serde(rename = "patientData")]
        patient_data: PatientEmailData,
        #[serde(rename = "consultationData")]
        consultation_data: ConsultationData,
    },
}

impl EmailRequest {
    /// Recipient address for this request.
    pub fn recipient(&self) -> &str {
        match self {
            EmailRequest::PatientWelcome(p) => &p.patient_email,
            EmailRequest::AppointmentConfirmation { patient_data, .. } => {
                &patient_data.patient_email
            }
            EmailRequest::ConsultationSaved { patient_data, .. } => &patient_data.patient_email,
        }
    }
}

/// Delivery outcome, mirroring the endpoint's 200/4xx body shapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailResponse {
    /// A successful delivery.
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    /// A failed delivery.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Parse a request body into a typed [`EmailRequest`].
///
/// Tolerates text around the JSON object, keeping only the outermost braces.
pub fn parse_email_request(body: &str) -> MailerResult<EmailRequest> {
    let json_start = body
        .find('{')
        .ok_or_else(|| MailerError::InvalidFormat("No JSON object found in body".into()))?;
    let json_end = body
        .rfind('}')
        .ok_or_else(|| MailerError::InvalidFormat("No closing brace found in body".into()))?;

    let request: EmailRequest = serde_json::from_str(&body[json_start..=json_end])?;
    Ok(request)
}
