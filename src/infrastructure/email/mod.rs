//! Email Module
//!
//! Transactional email rendering and delivery. Templates are embedded
//! in the binary; delivery goes through an async SMTP transport.

mod smtp;
mod templates;

pub use smtp::{EmailMessage, SmtpMailer};
pub use templates::{RenderedEmail, TemplateRenderer};

use tera::Context;

use crate::config::Settings;
use crate::shared::error::AppError;

/// High level mail service combining the template renderer and the
/// SMTP transport. One instance is built at startup and shared via the
/// application state.
pub struct Mailer {
    smtp: SmtpMailer,
    renderer: TemplateRenderer,
    project_name: String,
    public_url: String,
    reset_token_expiry_hours: i64,
}

impl Mailer {
    /// Build the mailer from application settings.
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self {
            smtp: SmtpMailer::new(&settings.smtp)?,
            renderer: TemplateRenderer::new()?,
            project_name: settings.project_name.clone(),
            public_url: settings.server.public_url.trim_end_matches('/').to_string(),
            reset_token_expiry_hours: settings.jwt.reset_token_expiry_hours,
        })
    }

    /// Send the welcome email for a freshly registered account.
    pub async fn send_new_account_email(
        &self,
        email_to: &str,
        username: &str,
    ) -> Result<(), AppError> {
        let (subject, context) = self.new_account_params(email_to, username);
        self.send("new_account", email_to, subject, &context).await
    }

    /// Send the password recovery email with the reset link.
    pub async fn send_reset_password_email(
        &self,
        email_to: &str,
        username: &str,
        token: &str,
    ) -> Result<(), AppError> {
        let (subject, context) = self.reset_password_params(email_to, username, token);
        self.send("reset_password", email_to, subject, &context).await
    }

    /// Send the test email used to verify SMTP configuration.
    pub async fn send_test_email(&self, email_to: &str) -> Result<(), AppError> {
        let (subject, context) = self.test_email_params(email_to);
        self.send("test_email", email_to, subject, &context).await
    }

    async fn send(
        &self,
        template: &str,
        email_to: &str,
        subject: String,
        context: &Context,
    ) -> Result<(), AppError> {
        let rendered = self.renderer.render(template, context)?;
        self.smtp
            .send(&EmailMessage {
                to: email_to.to_string(),
                subject,
                html_body: rendered.html_body,
                text_body: rendered.text_body,
            })
            .await
    }

    fn new_account_params(&self, email_to: &str, username: &str) -> (String, Context) {
        let subject = format!("{} - New account for user {}", self.project_name, username);

        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("username", username);
        context.insert("email", email_to);
        context.insert("link", &self.public_url);

        (subject, context)
    }

    fn reset_password_params(&self, email_to: &str, username: &str, token: &str) -> (String, Context) {
        let subject = format!(
            "{} - Password recovery for user {}",
            self.project_name, username
        );
        let link = format!("{}/reset-password?token={}", self.public_url, token);

        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("username", username);
        context.insert("email", email_to);
        context.insert("valid_hours", &self.reset_token_expiry_hours);
        context.insert("link", &link);

        (subject, context)
    }

    fn test_email_params(&self, email_to: &str) -> (String, Context) {
        let subject = format!("{} - Test email", self.project_name);

        let mut context = Context::new();
        context.insert("project_name", &self.project_name);
        context.insert("email", email_to);

        (subject, context)
    }
}
