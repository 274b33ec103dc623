//! Minijinja template rendering for escalation email bodies.
//!
//! Templates are arbitrary strings (not pre-registered files), so a fresh
//! [`minijinja::Environment`] is created per render call. The render context
//! is the serialized [`EmailRequest`], so templates can reach `title`,
//! `message`, and every `email_data` field.

use crate::traits::{EmailRequest, NotifyError};

/// Default plain-text body for escalation emails.
pub const DEFAULT_BODY_TEMPLATE: &str = "\
{{ message }}

Finding:          {{ email_data.finding_title }}
Project:          {{ email_data.project_name }}
Severity:         {{ email_data.severity | upper }}
Due date:         {{ email_data.due_date }}
Escalation level: {{ email_data.escalation_level }}

Please review and resolve this finding as soon as possible.";

/// Renders email body templates using minijinja.
#[derive(Debug)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("upper", upper_filter);
        env.add_filter("lower", lower_filter);
        env
    }

    /// Render a template string against an email request.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render(&self, template_str: &str, request: &EmailRequest) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, request)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Validate that a template string parses without errors.
    ///
    /// This does not evaluate the template, it only checks syntax.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn upper_filter(value: String) -> String {
    value.to_uppercase()
}

fn lower_filter(value: String) -> String {
    value.to_lowercase()
}
