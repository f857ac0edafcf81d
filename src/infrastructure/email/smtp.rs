//! SMTP Transport
//!
//! Outbound mail over lettre's async SMTP transport. STARTTLS and
//! credentials are applied according to the SMTP settings; local
//! relays (e.g. Mailpit) run without TLS.

use std::time::Duration;

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpSettings;
use crate::shared::error::AppError;

/// A fully prepared outbound email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// SMTP mail sender wrapping `lettre::AsyncSmtpTransport`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from settings. No connection is made until
    /// the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self, AppError> {
        let mut builder = if settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| AppError::Mail(format!("SMTP transport setup failed: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        builder = builder
            .port(settings.port)
            .timeout(Some(Duration::from_secs(settings.timeout_secs)));

        if let (Some(user), Some(password)) = (&settings.user, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let from = format_mailbox(&settings.from_email, settings.from_name.as_deref())
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Send a multipart/alternative (text + HTML) email.
    pub async fn send(&self, email: &EmailMessage) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::Mail(format!("Invalid recipient address: {}", e)))?)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| AppError::Mail(format!("Message build failed: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("SMTP send failed: {}", e)))?;

        tracing::info!(subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Format a From header value, with display name when configured.
fn format_mailbox(email: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{} <{}>", name, email),
        None => email.to_string(),
    }
}
