//! SMTP delivery via lettre.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::request::{EmailResponse, MailerError, MailerResult};
use crate::templates::EmailMessage;

/// Relay configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay host, e.g. `smtp.gmail.com`
    pub relay: String,
    /// Account username (also the From address)
    pub username: String,
    /// Account password or app password
    pub password: String,
    /// Display name on the From header
    pub from_name: String,
}

impl SmtpConfig {
    /// Read `SMTP_RELAY`, `SMTP_USER`, `SMTP_PASS`, and optionally
    /// `SMTP_FROM_NAME` from the environment.
    pub fn from_env() -> MailerResult<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| MailerError::Config(name.to_string()))
        };
        Ok(Self {
            relay: var("SMTP_RELAY")?,
            username: var("SMTP_USER")?,
            password: var("SMTP_PASS")?,
            from_name: std::env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Clínica Médica".into()),
        })
    }
}

/// SMTP mailer holding a configured transport.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    /// Build a mailer from a config.
    pub fn new(config: &SmtpConfig) -> MailerResult<Self> {
        let transport = SmtpTransport::relay(&config.relay)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            from: format!("{} <{}>", config.from_name, config.username),
        })
    }

    /// Deliver a rendered message. Failures are reported in the response,
    /// never panicked on.
    pub fn send(&self, message: &EmailMessage) -> EmailResponse {
        let email = match self.build(message) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(error = %e, to = %message.to, "Failed to build email");
                return EmailResponse::failed(e.to_string());
            }
        };

        match self.transport.send(&email) {
            Ok(response) => {
                let message_id = response.code().to_string();
                tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
                EmailResponse::sent(message_id)
            }
            Err(e) => {
                tracing::error!(error = %e, to = %message.to, "Failed to send email");
                EmailResponse::failed(e.to_string())
            }
        }
    }

    fn build(&self, message: &EmailMessage) -> MailerResult<Message> {
        Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| MailerError::Transport(format!("bad From address: {}", e)))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| MailerError::Transport(format!("bad To address: {}", e)))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| MailerError::Transport(e.to_string()))
    }
}
