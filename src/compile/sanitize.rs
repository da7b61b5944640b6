//! Request sanitizer.
//!
//! Only the manuscript text can fail a request. Formatting choices outside
//! their enumerations are replaced with defaults, unless strict mode is on.

use serde_json::Value;

use super::models::{CompileRequest, SanitizedRequest};
use super::validation::ValidationError;
use super::CompileError;
use crate::layout::{MarginPreset, PageSize};
use crate::templates::TemplateRegistry;

pub const DEFAULT_TITLE: &str = "Manuscript";
pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct Sanitizer<'a> {
    templates: &'a TemplateRegistry,
    max_manuscript_bytes: usize,
    strict: bool,
}

impl<'a> Sanitizer<'a> {
    pub fn new(templates: &'a TemplateRegistry, max_manuscript_bytes: usize) -> Self {
        Self {
            templates,
            max_manuscript_bytes,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn sanitize(&self, request: CompileRequest) -> Result<SanitizedRequest, CompileError> {
        let manuscript_text = match request.manuscript_text {
            Some(Value::String(text)) if !text.is_empty() => text,
            _ => {
                return Err(CompileError::InvalidRequest(ValidationError::required_text(
                    "manuscriptText",
                )))
            }
        };

        if manuscript_text.len() > self.max_manuscript_bytes {
            return Err(CompileError::PayloadTooLarge {
                actual: manuscript_text.len(),
                limit: self.max_manuscript_bytes,
            });
        }

        let template = self.choose(
            "template",
            request.template.as_ref(),
            |key| self.templates.lookup(key).map(|d| d.key),
            self.templates.default_template().key,
            &self.templates.keys(),
        )?;
        let page_size = self.choose(
            "pageSize",
            request.page_size.as_ref(),
            PageSize::from_key,
            PageSize::default(),
            &PageSize::ALL.map(|s| s.as_str()),
        )?;
        let margin_preset = self.choose(
            "marginPreset",
            request.margin_preset.as_ref(),
            MarginPreset::from_key,
            MarginPreset::default(),
            &MarginPreset::ALL.map(|p| p.as_str()),
        )?;

        Ok(SanitizedRequest {
            manuscript_text,
            title: sanitize_title(request.title.as_ref()),
            template,
            page_size,
            margin_preset,
        })
    }

    /// Resolve an enumerated field. Missing values always take the default;
    /// unknown ones take it too unless strict mode rejects them.
    fn choose<T>(
        &self,
        field: &str,
        raw: Option<&Value>,
        parse: impl Fn(&str) -> Option<T>,
        default: T,
        allowed: &[&str],
    ) -> Result<T, CompileError> {
        let raw = match raw {
            None | Some(Value::Null) => return Ok(default),
            Some(value) => value,
        };

        let parsed = raw.as_str().and_then(|key| parse(key));
        match parsed {
            Some(value) => Ok(value),
            None if self.strict => Err(CompileError::InvalidRequest(ValidationError::unknown_value(
                field,
                &display_value(raw),
                allowed,
            ))),
            None => {
                log::debug!("Substituting default for unknown {} {}", field, raw);
                Ok(default)
            }
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Missing, blank or non-string titles become [`DEFAULT_TITLE`]; line breaks
/// become spaces and the result is capped at [`MAX_TITLE_CHARS`] characters.
pub fn sanitize_title(raw: Option<&Value>) -> String {
    let title = match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
        _ => return DEFAULT_TITLE.to_string(),
    };

    title
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .take(MAX_TITLE_CHARS)
        .collect()
}
