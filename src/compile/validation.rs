//! Validation errors for compile requests.
//!
//! Messages are written for the editor UI, so every error names the field
//! and, where it helps, what to send instead.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Request field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the request
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Required field missing, empty, or not a string.
    pub fn required_text(field: &str) -> Self {
        Self::new(field, format!("{} is required", field))
            .with_suggestion("Send the manuscript as a non-empty Markdown string")
    }

    /// Value outside a closed enumeration (strict mode only).
    pub fn unknown_value(field: &str, value: &str, allowed: &[&str]) -> Self {
        Self::new(field, format!("Unknown {} '{}'", field, value))
            .with_suggestion(format!("Use one of: {}", allowed.join(", ")))
    }

    /// Request body was not a JSON object.
    pub fn malformed_body(detail: impl fmt::Display) -> Self {
        Self::new("body", format!("Request body is not valid JSON: {}", detail))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_message() {
        let error = ValidationError::required_text("manuscriptText");
        assert_eq!(error.field, "manuscriptText");
        assert!(error.to_string().starts_with("manuscriptText is required."));
    }

    #[test]
    fn test_unknown_value_lists_allowed() {
        let error = ValidationError::unknown_value("pageSize", "tabloid", &["letter", "a4"]);
        assert_eq!(error.to_string(), "Unknown pageSize 'tabloid'. Use one of: letter, a4");
    }
}
