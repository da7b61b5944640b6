use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::{PrometheusMetrics, PrometheusMetricsBuilder};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod compile;
pub mod config;
pub mod health;
pub mod layout;
pub mod metrics;
pub mod state;
pub mod templates;

pub use crate::config::Settings;
pub use crate::state::AppState;

use crate::compile::handlers::{DURATION_HEADER, FILENAME_HEADER, STYLE_WARNINGS_HEADER};
use crate::metrics::CompileMetrics;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn invalid_request(message: &str) -> Self {
        Self::new("invalid_request", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("internal_error", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::compile::handlers::compile,
        crate::templates::handlers::list_templates,
        crate::health::health,
        crate::health::health_details
    ),
    components(
        schemas(
            compile::CompileRequest,
            compile::models::CompileFailureResponse,
            compile::models::PayloadTooLargeResponse,
            templates::TemplateDescriptor,
            templates::TemplateKey,
            layout::GridFamily,
            layout::PageSize,
            layout::MarginPreset,
            health::HealthResponse,
            health::HealthDetails,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Compile", description = "Markdown to PDF typesetting."),
        (name = "Templates", description = "Available document templates."),
        (name = "Health", description = "Liveness and capability probes.")
    )
)]
pub struct ApiDoc;

/// Register every route on an app or test service.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::config).service(
        web::scope("/api")
            .configure(compile::handlers::config)
            .configure(templates::handlers::config),
    );
}

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![
            header::CONTENT_DISPOSITION.as_str(),
            FILENAME_HEADER,
            DURATION_HEADER,
            STYLE_WARNINGS_HEADER,
        ])
        .max_age(3600)
}

/// HTTP metrics middleware serving `/metrics`, with the compile counters
/// registered on the same registry.
pub fn metrics_middleware(metrics: &CompileMetrics) -> std::io::Result<PrometheusMetrics> {
    let prometheus = PrometheusMetricsBuilder::new("pageperfect")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("failed to create Prometheus middleware: {}", e)))?;
    metrics
        .register(&prometheus.registry)
        .map_err(|e| std::io::Error::other(format!("failed to register compile metrics: {}", e)))?;
    Ok(prometheus)
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Typesetter: {} (engine {}), templates in {}, timeout {:?}",
        settings.compiler.program.display(),
        settings.compiler.pdf_engine,
        settings.compiler.template_dir.display(),
        settings.compiler.timeout
    );

    let bind = (settings.host.clone(), settings.port);
    let json_body_limit = settings.json_body_limit;
    let allowed_origins = settings.allowed_origins.clone();
    let app_state = web::Data::new(AppState::new(settings));

    let prometheus = metrics_middleware(&app_state.metrics)?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .app_data(compile::handlers::json_config(json_body_limit))
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await
}
