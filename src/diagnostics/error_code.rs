/// Distinguishes problems found while building a program from those raised
/// while running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Static,
    Runtime,
}

impl ErrorType {
    /// Prefix used in rendered headers.
    pub fn prefix(&self) -> &'static str {
        match self {
            ErrorType::Static => "Static error",
            ErrorType::Runtime => "Runtime error",
        }
    }
}

/// A diagnostic kind: stable code, title, and message template with `{}`
/// placeholders.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
    pub error_type: ErrorType,
    pub message: &'static str,
    pub hint: Option<&'static str>,
}
