//! Template descriptors and the registry consulted by the sanitizer and the
//! compile orchestrator.

pub mod handlers;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::layout::GridFamily;

/// Known template keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKey {
    #[default]
    Chicago,
    Paperback,
    Symphony,
    Chronicle,
    Exhibit,
    Matrix,
    AvantGarde,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 7] = [
        TemplateKey::Chicago,
        TemplateKey::Paperback,
        TemplateKey::Symphony,
        TemplateKey::Chronicle,
        TemplateKey::Exhibit,
        TemplateKey::Matrix,
        TemplateKey::AvantGarde,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chicago => "chicago",
            Self::Paperback => "paperback",
            Self::Symphony => "symphony",
            Self::Chronicle => "chronicle",
            Self::Exhibit => "exhibit",
            Self::Matrix => "matrix",
            Self::AvantGarde => "avantGarde",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|template| template.as_str() == key)
    }

    /// Short token used in download filenames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chicago => "chicago",
            Self::Paperback => "paperback",
            Self::Symphony => "symphony",
            Self::Chronicle => "chronicle",
            Self::Exhibit => "exhibit",
            Self::Matrix => "matrix",
            Self::AvantGarde => "avant-garde",
        }
    }
}

/// Display metadata and typesetting inputs for one template.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub key: TemplateKey,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub main_font: &'static str,
    pub grid_type: GridFamily,
    #[serde(skip)]
    pub file_name: &'static str,
}

impl TemplateDescriptor {
    fn for_key(key: TemplateKey) -> Self {
        let (name, category, description, main_font, grid_type) = match key {
            TemplateKey::Chicago => (
                "Classic Academic (Chicago)",
                "legacy",
                "Traditional academic style with footnote-friendly spacing",
                "DejaVu Serif",
                GridFamily::Academic,
            ),
            TemplateKey::Paperback => (
                "Modern Trade Paperback",
                "legacy",
                "Contemporary trade book design",
                "Lato",
                GridFamily::Trade,
            ),
            TemplateKey::Symphony => (
                "Symphony Layout",
                "academic",
                "Classic academic design with harmonious typography",
                "TeX Gyre Pagella",
                GridFamily::Academic,
            ),
            TemplateKey::Chronicle => (
                "Chronicle Grid",
                "academic",
                "Editorial-style layout with multi-column grid",
                "TeX Gyre Termes",
                GridFamily::Editorial,
            ),
            TemplateKey::Exhibit => (
                "Exhibit Frame",
                "trade",
                "Modern trade design with clean lines",
                "TeX Gyre Heros",
                GridFamily::Trade,
            ),
            TemplateKey::Matrix => (
                "Corporate Matrix",
                "trade",
                "Structured business layout",
                "DejaVu Sans",
                GridFamily::Corporate,
            ),
            TemplateKey::AvantGarde => (
                "Avant-Garde Canvas",
                "creative",
                "Experimental design with creative freedom",
                "TeX Gyre Adventor",
                GridFamily::Creative,
            ),
        };

        Self {
            key,
            name,
            category,
            description,
            main_font,
            grid_type,
            file_name: template_file_name(key),
        }
    }
}

fn template_file_name(key: TemplateKey) -> &'static str {
    match key {
        TemplateKey::Chicago => "chicago.latex",
        TemplateKey::Paperback => "paperback.latex",
        TemplateKey::Symphony => "symphony.latex",
        TemplateKey::Chronicle => "chronicle.latex",
        TemplateKey::Exhibit => "exhibit.latex",
        TemplateKey::Matrix => "matrix.latex",
        TemplateKey::AvantGarde => "avant-garde.latex",
    }
}

/// Immutable table of templates, built once at startup.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    template_dir: PathBuf,
    descriptors: Vec<TemplateDescriptor>,
    default_key: TemplateKey,
}

impl TemplateRegistry {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            descriptors: TemplateKey::ALL.iter().map(|k| TemplateDescriptor::for_key(*k)).collect(),
            default_key: TemplateKey::default(),
        }
    }

    /// Directory shipped with the crate.
    pub fn bundled_dir() -> &'static Path {
        Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static/templates"))
    }

    pub fn get(&self, key: TemplateKey) -> &TemplateDescriptor {
        // Indexed by discriminant: `descriptors` follows TemplateKey::ALL.
        &self.descriptors[key as usize]
    }

    /// Look up a raw request key.
    pub fn lookup(&self, key: &str) -> Option<&TemplateDescriptor> {
        TemplateKey::from_key(key).map(|k| self.get(k))
    }

    /// Look up a raw request key, substituting the default template when unknown.
    pub fn resolve(&self, key: Option<&str>) -> &TemplateDescriptor {
        key.and_then(|k| self.lookup(k))
            .unwrap_or_else(|| self.default_template())
    }

    pub fn default_template(&self) -> &TemplateDescriptor {
        self.get(self.default_key)
    }

    pub fn template_path(&self, key: TemplateKey) -> PathBuf {
        self.template_dir.join(self.get(key).file_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.descriptors.iter()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.key.as_str()).collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new(Self::bundled_dir())
    }
}
