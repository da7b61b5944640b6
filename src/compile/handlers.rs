use actix_web::body::SizedStream;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::header;
use actix_web::{web, HttpResponse};

use super::diagnostics::style_warnings;
use super::models::{CompileFailureResponse, CompileRequest, PayloadTooLargeResponse};
use super::validation::ValidationError;
use super::{CompileError, CompiledDocument, Sanitizer};
use crate::{AppState, ErrorResponse};

pub const FILENAME_HEADER: &str = "X-Filename";
pub const DURATION_HEADER: &str = "X-Compile-Duration-Ms";
pub const STYLE_WARNINGS_HEADER: &str = "X-Style-Warnings";

#[utoipa::path(
    context_path = "/api",
    tag = "Compile",
    post,
    path = "/compile",
    request_body = CompileRequest,
    responses(
        (status = 200, description = "Typeset PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid request or typesetting failed", body = CompileFailureResponse),
        (status = 413, description = "Manuscript exceeds the size limit", body = PayloadTooLargeResponse),
        (status = 504, description = "Typesetting timed out", body = CompileFailureResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn compile(state: web::Data<AppState>, body: web::Json<CompileRequest>) -> HttpResponse {
    let sanitizer = Sanitizer::new(&state.templates, state.settings.max_manuscript_bytes)
        .strict(state.settings.strict_formatting);

    let request = match sanitizer.sanitize(body.into_inner()) {
        Ok(request) => request,
        Err(e) => {
            log::info!("Rejected compile request: {}", e);
            state.metrics.record_failure(e.error_code());
            return error_response(&e, Vec::new());
        }
    };

    let warnings = style_warnings(&request.manuscript_text);

    match state.compiler.compile_detached(request).await {
        Ok(document) => {
            state.metrics.record_success(document.duration);
            pdf_response(document, &warnings)
        }
        Err(e) => {
            state.metrics.record_failure(e.error_code());
            error_response(&e, warnings)
        }
    }
}

fn pdf_response(document: CompiledDocument, warnings: &[String]) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    response
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", document.filename),
        ))
        .insert_header((FILENAME_HEADER, document.filename.clone()))
        .insert_header((DURATION_HEADER, document.duration.as_millis().to_string()));

    if !warnings.is_empty() {
        response.insert_header((STYLE_WARNINGS_HEADER, warnings.join(" | ")));
    }

    response.body(SizedStream::new(document.size, document.stream))
}

/// Convert a compile error into its JSON response.
pub fn error_response(error: &CompileError, warnings: Vec<String>) -> HttpResponse {
    let status = error.status_code();
    let code = error.error_code();

    match error {
        CompileError::InvalidRequest(validation) => {
            HttpResponse::build(status).json(ErrorResponse::new(code, &validation.to_string()))
        }
        CompileError::PayloadTooLarge { actual, limit } => {
            HttpResponse::build(status).json(PayloadTooLargeResponse {
                error: code.to_string(),
                message: error.to_string(),
                actual_bytes: Some(*actual),
                limit_bytes: *limit,
            })
        }
        CompileError::CompileFailed(report) => {
            HttpResponse::build(status).json(CompileFailureResponse {
                error: code.to_string(),
                message: report.message.clone(),
                missing_citations: report.missing_citations.clone(),
                missing_packages: report.missing_packages.clone(),
                warnings,
                detail: report.detail.clone(),
            })
        }
        CompileError::Timeout(_) => HttpResponse::build(status).json(CompileFailureResponse {
            error: code.to_string(),
            message: error.to_string(),
            missing_citations: Vec::new(),
            missing_packages: Vec::new(),
            warnings,
            detail: String::new(),
        }),
        internal => {
            log::error!("Compile request failed: {}", internal);
            HttpResponse::build(status).json(ErrorResponse::internal_error(
                "The typesetting service hit an internal error. Please try again.",
            ))
        }
    }
}

/// JSON extractor settings: malformed bodies become `invalid_request`,
/// oversized ones `payload_too_large`.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = match &err {
                JsonPayloadError::OverflowKnownLength { length, limit } => {
                    HttpResponse::PayloadTooLarge().json(PayloadTooLargeResponse {
                        error: "payload_too_large".to_string(),
                        message: format!("Request body is {} bytes, the limit is {} bytes.", length, limit),
                        actual_bytes: Some(*length),
                        limit_bytes: *limit,
                    })
                }
                JsonPayloadError::Overflow { limit } => {
                    HttpResponse::PayloadTooLarge().json(PayloadTooLargeResponse {
                        error: "payload_too_large".to_string(),
                        message: format!("Request body exceeds the limit of {} bytes.", limit),
                        actual_bytes: None,
                        limit_bytes: *limit,
                    })
                }
                other => HttpResponse::BadRequest().json(ErrorResponse::invalid_request(
                    &ValidationError::malformed_body(other).to_string(),
                )),
            };
            InternalError::from_response(err, response).into()
        })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/compile").route(web::post().to(compile)));
}
