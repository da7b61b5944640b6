use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::layout::{MarginPreset, PageSize};
use crate::AppState;

pub const SERVICE_NAME: &str = "pageperfect-server";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthDetails {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub templates: Vec<String>,
    pub page_sizes: Vec<String>,
    pub margin_presets: Vec<String>,
    pub strict_formatting: bool,
}

#[utoipa::path(
    tag = "Health",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
    })
}

#[utoipa::path(
    tag = "Health",
    get,
    path = "/health/details",
    responses(
        (status = 200, description = "Service capabilities", body = HealthDetails)
    )
)]
pub async fn health_details(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthDetails {
        ok: true,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        templates: state.templates.keys().into_iter().map(str::to_string).collect(),
        page_sizes: PageSize::ALL.iter().map(|s| s.as_str().to_string()).collect(),
        margin_presets: MarginPreset::ALL.iter().map(|p| p.as_str().to_string()).collect(),
        strict_formatting: state.settings.strict_formatting,
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/health/details").route(web::get().to(health_details)));
}
