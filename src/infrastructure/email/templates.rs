//! Email Template Rendering
//!
//! Tera templates embedded at compile time with `include_str!`. Each
//! email is rendered in both HTML and plain-text form.

use tera::{Context, Tera};

use crate::shared::error::AppError;

/// Rendered body pair for a multipart/alternative email.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub html_body: String,
    pub text_body: String,
}

/// Template renderer wrapping the tera engine.
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// Create a renderer with all embedded templates registered.
    pub fn new() -> Result<Self, AppError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "new_account.html",
                    include_str!("../../../templates/new_account.html"),
                ),
                (
                    "new_account.txt",
                    include_str!("../../../templates/new_account.txt"),
                ),
                (
                    "reset_password.html",
                    include_str!("../../../templates/reset_password.html"),
                ),
                (
                    "reset_password.txt",
                    include_str!("../../../templates/reset_password.txt"),
                ),
                (
                    "test_email.html",
                    include_str!("../../../templates/test_email.html"),
                ),
                (
                    "test_email.txt",
                    include_str!("../../../templates/test_email.txt"),
                ),
            ])
            .map_err(|e| AppError::Mail(format!("Template registration failed: {}", e)))?;

        Ok(Self { engine })
    }

    /// Render the HTML and text variants of the named template.
    pub fn render(&self, template: &str, context: &Context) -> Result<RenderedEmail, AppError> {
        let html_body = self
            .engine
            .render(&format!("{template}.html"), context)
            .map_err(|e| AppError::Mail(format!("Template rendering failed: {}", e)))?;

        let text_body = self
            .engine
            .render(&format!("{template}.txt"), context)
            .map_err(|e| AppError::Mail(format!("Template rendering failed: {}", e)))?;

        Ok(RenderedEmail {
            html_body,
            text_body,
        })
    }
}
