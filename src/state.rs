//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::compile::{CompileService, DiagnosticParser};
use crate::config::Settings;
use crate::metrics::CompileMetrics;
use crate::templates::TemplateRegistry;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub templates: Arc<TemplateRegistry>,
    pub compiler: CompileService,
    pub metrics: CompileMetrics,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_diagnostics(settings, DiagnosticParser::default())
    }

    /// Build state with a custom diagnostic rule table.
    pub fn with_diagnostics(settings: Settings, diagnostics: DiagnosticParser) -> Self {
        let templates = Arc::new(TemplateRegistry::new(&settings.compiler.template_dir));
        let compiler = CompileService::new(
            Arc::new(settings.compiler.clone()),
            templates.clone(),
            Arc::new(diagnostics),
        );

        Self {
            settings: Arc::new(settings),
            templates,
            compiler,
            metrics: CompileMetrics::new(),
        }
    }
}
