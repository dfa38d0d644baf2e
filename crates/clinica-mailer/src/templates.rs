//! HTML builders for the clinic's notification emails.
//!
//! Pure functions over the request payloads, testable without a transport.
//! User-facing copy is Spanish, matching what patients receive.

use crate::request::{AppointmentData, ConsultationData, EmailRequest, PatientEmailData};

/// A rendered message, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Render any request into a message.
pub fn render(request: &EmailRequest) -> EmailMessage {
    match request {
        EmailRequest::PatientWelcome(patient) => patient_welcome(patient),
        EmailRequest::AppointmentConfirmation {
            patient_data,
            appointment_data,
        } => appointment_confirmation(patient_data, appointment_data),
        EmailRequest::ConsultationSaved {
            patient_data,
            consultation_data,
        } => consultation_saved(patient_data, consultation_data),
    }
}

/// Welcome email after registration.
pub fn patient_welcome(patient: &PatientEmailData) -> EmailMessage {
    let mut body = body_open();
    body.push_str(&format!(
        "<h2 style=\"color: #2c3e50;\">¡Bienvenido/a, {}!</h2>\n",
        escape_html(&patient.patient_name)
    ));
    body.push_str("<p>Su registro en nuestra clínica ha sido exitoso.</p>\n");
    push_field(&mut body, "Nombre", &patient.patient_name);
    push_field(&mut body, "Email", &patient.patient_email);
    push_field(&mut body, "Fecha de nacimiento", &patient.birthdate);
    push_field(&mut body, "Género", &patient.sex);
    if let Some(dni) = &patient.dni {
        push_field(&mut body, "DNI", dni);
    }
    if let Some(phone) = &patient.emergency_number {
        push_field(&mut body, "Teléfono de emergencia", phone);
    }
    if let Some(direccion) = &patient.direccion {
        push_field(&mut body, "Dirección", direccion);
    }
    body.push_str(CLOSING);

    EmailMessage {
        to: patient.patient_email.clone(),
        subject: "Bienvenido a nuestra Clínica - Registro Exitoso".into(),
        html: body,
    }
}

/// Appointment confirmation.
pub fn appointment_confirmation(
    patient: &PatientEmailData,
    appointment: &AppointmentData,
) -> EmailMessage {
    let mut body = body_open();
    body.push_str("<h2 style=\"color: #2c3e50;\">Cita Confirmada</h2>\n");
    body.push_str(&format!(
        "<p>Estimado/a <strong>{}</strong>, su cita médica ha sido programada exitosamente.</p>\n",
        escape_html(&patient.patient_name)
    ));
    push_field(&mut body, "Fecha", &appointment.date);
    push_field(&mut body, "Hora", &appointment.time);
    push_field(&mut body, "Tipo de consulta", &appointment.consultation_type);
    if let Some(notes) = &appointment.notes {
        push_field(&mut body, "Notas", notes);
    }
    body.push_str(CLOSING);

    EmailMessage {
        to: patient.patient_email.clone(),
        subject: "Confirmación de Cita Médica".into(),
        html: body,
    }
}

/// Summary email after a consultation is recorded.
pub fn consultation_saved(
    patient: &PatientEmailData,
    consultation: &ConsultationData,
) -> EmailMessage {
    let mut body = body_open();
    body.push_str("<h2 style=\"color: #2c3e50;\">Consulta Guardada Exitosamente</h2>\n");
    body.push_str(&format!(
        "<p>Estimado/a <strong>{}</strong>, su consulta médica ha sido registrada.</p>\n",
        escape_html(&patient.patient_name)
    ));
    body.push_str("<h3>Detalles de la Consulta</h3>\n");
    push_field(&mut body, "Fecha", &consultation.date);
    push_field(
        &mut body,
        "Precio",
        &format_money(consultation.consultation_price),
    );
    body.push_str("<h3>Información Médica</h3>\n");
    push_field(&mut body, "Síntomas", &consultation.symptoms);
    push_field(&mut body, "Diagnóstico", &consultation.diagnosis);
    if let Some(prescription) = &consultation.prescription {
        push_field(&mut body, "Receta", prescription);
    }
    if !consultation.medications.is_empty() {
        body.push_str("<h3>Medicamentos</h3>\n");
        for med in &consultation.medications {
            body.push_str(&format!(
                "<p>{} - {} unidad(es) - {} c/u</p>\n",
                escape_html(&med.name),
                med.quantity,
                format_money(med.price)
            ));
        }
    }
    body.push_str(&format!("<h3>Total: {}</h3>\n", format_money(consultation.total)));
    if let Some(notes) = &consultation.notes {
        push_field(&mut body, "Notas", notes);
    }
    body.push_str(CLOSING);

    EmailMessage {
        to: patient.patient_email.clone(),
        subject: "Consulta Médica Guardada - Resumen".into(),
        html: body,
    }
}

const CLOSING: &str =
    "<p>Gracias por confiar en nuestros servicios médicos.</p>\n</div>\n";

fn body_open() -> String {
    String::from(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\n\
         <h1 style=\"color: #2c3e50; text-align: center;\">Clínica Médica</h1>\n",
    )
}

fn push_field(body: &mut String, label: &str, value: &str) {
    body.push_str(&format!(
        "<p><strong>{}:</strong> {}</p>\n",
        label,
        escape_html(value)
    ));
}

fn format_money(amount: f64) -> String {
    format!("C${:.2}", amount)
}

/// Escape user-supplied text for HTML interpolation.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
