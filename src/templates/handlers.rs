use actix_web::{web, HttpResponse, Responder};

use super::TemplateDescriptor;
use crate::AppState;

#[utoipa::path(
    context_path = "/api",
    tag = "Templates",
    get,
    path = "/templates",
    responses(
        (status = 200, description = "All available templates", body = [TemplateDescriptor])
    )
)]
pub async fn list_templates(state: web::Data<AppState>) -> impl Responder {
    let templates: Vec<&TemplateDescriptor> = state.templates.iter().collect();
    HttpResponse::Ok().json(templates)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/templates").route(web::get().to(list_templates)));
}
