//! Compile pipeline: sanitize, typeset, classify failures.
//!
//! - `sanitize` - request validation and default substitution
//! - `orchestrator` - per-job workspace and typesetter subprocess
//! - `diagnostics` - stderr classification and style warnings
//! - `naming` - download filenames
//! - `handlers` - the `/api/compile` endpoint

pub mod diagnostics;
pub mod handlers;
pub mod models;
pub mod naming;
pub mod orchestrator;
pub mod sanitize;
pub mod stream;
pub mod validation;

pub use diagnostics::{DiagnosticParser, DiagnosticReport, DiagnosticRule};
pub use models::{CompileRequest, SanitizedRequest};
pub use orchestrator::{CompileService, CompiledDocument};
pub use sanitize::Sanitizer;
pub use validation::ValidationError;

use std::time::Duration;

use actix_web::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    InvalidRequest(ValidationError),
    #[error("Manuscript is {actual} bytes, the limit is {limit} bytes.")]
    PayloadTooLarge { actual: usize, limit: usize },
    #[error("{}", .0.message)]
    CompileFailed(DiagnosticReport),
    #[error("Typesetting exceeded the {}s time limit and was stopped.", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("failed to create job workspace: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("failed to write job input: {0}")]
    WriteInput(#[source] std::io::Error),
    #[error("failed to launch typesetter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for typesetter: {0}")]
    Wait(#[source] std::io::Error),
    #[error("failed to open typeset PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("compile task aborted: {0}")]
    Aborted(String),
}

impl CompileError {
    /// Machine-readable `error` field of the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::CompileFailed(_) => "compile_failed",
            Self::Timeout(_) => "compile_timeout",
            Self::Workspace(_)
            | Self::WriteInput(_)
            | Self::Spawn { .. }
            | Self::Wait(_)
            | Self::ReadPdf(_)
            | Self::Aborted(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::CompileFailed(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}
