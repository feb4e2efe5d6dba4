use std::env;

use crate::graph::TermId;

use super::{ErrorCode, ErrorType, format_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub title: String,
    pub code: Option<String>,
    pub error_type: Option<ErrorType>,
    pub message: Option<String>,
    /// The offending term, if there is one.
    pub term: Option<TermId>,
    /// Where the term sits, as a path of unique names (`f/_add`).
    pub location: Option<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            code: None,
            error_type: None,
            message: None,
            term: None,
            location: None,
            hints: Vec::new(),
        }
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(title)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_term(mut self, term: TermId) -> Self {
        self.term = Some(term);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Builds a diagnostic from an [`ErrorCode`]. `values` fill the message
    /// placeholders first; whatever is left fills the hint.
    pub fn make_error(spec: &'static ErrorCode, values: &[&str]) -> Self {
        let used = spec.message.matches("{}").count().min(values.len());
        let mut diag = Diagnostic::error(spec.title)
            .with_code(spec.code)
            .with_error_type(spec.error_type)
            .with_message(format_message(spec.message, &values[..used]));
        if let Some(hint) = spec.hint {
            diag = diag.with_hint(format_message(hint, &values[used..]));
        }
        diag
    }

    /// Same as [`Self::make_error`] but with a message produced at run time.
    pub fn make_error_dynamic(spec: &'static ErrorCode, message: impl Into<String>) -> Self {
        Diagnostic::error(spec.title)
            .with_code(spec.code)
            .with_error_type(spec.error_type)
            .with_message(message)
    }

    /// Renders with color unless `NO_COLOR` is set.
    pub fn render(&self) -> String {
        self.render_with(env::var_os("NO_COLOR").is_none())
    }

    pub fn render_with(&self, use_color: bool) -> String {
        let yellow = "\u{1b}[33m";
        let reset = "\u{1b}[0m";
        let mut out = String::new();

        let label = match (self.severity, self.error_type) {
            (Severity::Warning, _) => "Warning",
            (_, Some(error_type)) => error_type.prefix(),
            (_, None) => "Error",
        };
        let code = self.code.as_deref().unwrap_or("E0000");

        // -- Runtime error: division by zero [E1008]
        if use_color {
            out.push_str(yellow);
        }
        out.push_str(&format!("-- {}: {} [{}]\n", label, self.title.to_lowercase(), code));
        if use_color {
            out.push_str(reset);
        }

        if let Some(message) = &self.message {
            out.push('\n');
            out.push_str(message);
            out.push('\n');
        }

        if let Some(location) = &self.location {
            out.push_str(&format!("  --> {}\n", location));
        }

        if !self.hints.is_empty() {
            out.push_str("\nHint:\n");
            for hint in &self.hints {
                out.push_str(&format!("  {}\n", hint));
            }
        }
        out
    }
}

pub fn render_diagnostics(diagnostics: &[Diagnostic], use_color: bool) -> String {
    diagnostics
        .iter()
        .map(|diag| diag.render_with(use_color))
        .collect::<Vec<_>>()
        .join("\n")
}
