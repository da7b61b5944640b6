use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::layout::{MarginPreset, PageSize};
use crate::templates::TemplateKey;

/// Compile request as received. Fields stay untyped until sanitized so that
/// a wrong-typed optional field degrades to its default instead of failing
/// the whole body.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    #[schema(value_type = String)]
    #[serde(default)]
    pub manuscript_text: Option<Value>,
    #[schema(value_type = Option<String>, example = "chicago")]
    #[serde(default)]
    pub template: Option<Value>,
    #[schema(value_type = Option<String>)]
    #[serde(default)]
    pub title: Option<Value>,
    #[schema(value_type = Option<String>, example = "letter")]
    #[serde(default)]
    pub page_size: Option<Value>,
    #[schema(value_type = Option<String>, example = "normal")]
    #[serde(default)]
    pub margin_preset: Option<Value>,
}

impl CompileRequest {
    /// Request carrying only manuscript text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            manuscript_text: Some(Value::String(text.into())),
            ..Default::default()
        }
    }
}

/// A request whose every field is known-good.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedRequest {
    pub manuscript_text: String,
    pub title: String,
    pub template: TemplateKey,
    pub page_size: PageSize,
    pub margin_preset: MarginPreset,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompileFailureResponse {
    pub error: String,
    pub message: String,
    pub missing_citations: Vec<String>,
    pub missing_packages: Vec<String>,
    pub warnings: Vec<String>,
    /// Last lines of the typesetter's diagnostic output
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayloadTooLargeResponse {
    pub error: String,
    pub message: String,
    /// Unknown when the body was cut off before it was fully read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_bytes: Option<usize>,
    pub limit_bytes: usize,
}
