//! Baseline-grid margin calculation.
//!
//! Margins are a whole number of baseline units (see [`MarginPreset::grid_units`]).
//! The baseline depends on the template's grid family, so the same preset
//! yields wider margins for academic layouts (12pt) than for the others (11pt).

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::page::{MarginPreset, PageSize};

const POINTS_PER_INCH: f64 = 72.0;
const MILLIMETRES_PER_INCH: f64 = 25.4;

/// Typographic baseline profile of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GridFamily {
    #[default]
    Academic,
    Editorial,
    Trade,
    Corporate,
    Creative,
}

impl GridFamily {
    pub const ALL: [GridFamily; 5] = [
        GridFamily::Academic,
        GridFamily::Editorial,
        GridFamily::Trade,
        GridFamily::Corporate,
        GridFamily::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Editorial => "editorial",
            Self::Trade => "trade",
            Self::Corporate => "corporate",
            Self::Creative => "creative",
        }
    }

    /// Parse a family key, falling back to [`GridFamily::Academic`].
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|family| family.as_str() == key)
            .unwrap_or_default()
    }

    /// Baseline unit in points.
    pub fn baseline_pt(&self) -> u32 {
        match self {
            Self::Academic => 12,
            Self::Editorial | Self::Trade | Self::Corporate | Self::Creative => 11,
        }
    }
}

/// A physical length as it appears in a geometry directive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Inches(f64),
    Millimetres(f64),
}

impl Length {
    pub fn to_inches(&self) -> f64 {
        match self {
            Self::Inches(v) => *v,
            Self::Millimetres(v) => *v / MILLIMETRES_PER_INCH,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inches(v) => write!(f, "{}in", format_decimal(*v)),
            Self::Millimetres(v) => write!(f, "{}mm", format_decimal(*v)),
        }
    }
}

/// Three decimals at most, no trailing zeros.
fn format_decimal(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Page dimensions plus a uniform margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub page_size: PageSize,
    pub margin: Length,
}

impl Geometry {
    /// The string handed to the typesetter's page-geometry mechanism.
    pub fn directive(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},margin={}", self.page_size.paper_directive(), self.margin)
    }
}

/// Margin for a preset on a given page size and grid family.
pub fn margin_for(page_size: PageSize, preset: MarginPreset, family: GridFamily) -> Length {
    let points = family.baseline_pt() * preset.grid_units();
    let inches = f64::from(points) / POINTS_PER_INCH;
    if page_size.is_metric() {
        Length::Millimetres(inches * MILLIMETRES_PER_INCH)
    } else {
        Length::Inches(inches)
    }
}

/// Derive the page geometry for a (size, preset, family) triple.
pub fn derive_geometry(page_size: PageSize, preset: MarginPreset, family: GridFamily) -> Geometry {
    Geometry {
        page_size,
        margin: margin_for(page_size, preset, family),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_normal_academic() {
        let geometry = derive_geometry(PageSize::Letter, MarginPreset::Normal, GridFamily::Academic);
        // 12pt * 5 = 60pt = 0.8333in
        assert_eq!(geometry.directive(), "letterpaper,margin=0.833in");
    }

    #[test]
    fn test_a4_uses_millimetres() {
        let geometry = derive_geometry(PageSize::A4, MarginPreset::Minimal, GridFamily::Trade);
        // 11pt * 2 = 22pt = 0.30556in = 7.761mm
        assert_eq!(geometry.directive(), "a4paper,margin=7.761mm");
    }

    #[test]
    fn test_a5_has_explicit_dimensions() {
        let geometry = derive_geometry(PageSize::A5, MarginPreset::Generous, GridFamily::Academic);
        // 12pt * 8 = 96pt = 1.3333in = 33.867mm
        assert_eq!(
            geometry.directive(),
            "paperwidth=148mm,paperheight=210mm,margin=33.867mm"
        );
    }

    #[test]
    fn test_whole_inch_margin_drops_decimals() {
        // 12pt * 6 = 72pt = exactly one inch
        let geometry = derive_geometry(PageSize::SixByNine, MarginPreset::Wide, GridFamily::Academic);
        assert_eq!(geometry.directive(), "paperwidth=6in,paperheight=9in,margin=1in");
    }

    #[test]
    fn test_family_changes_absolute_margin() {
        let academic = margin_for(PageSize::Letter, MarginPreset::Normal, GridFamily::Academic);
        let trade = margin_for(PageSize::Letter, MarginPreset::Normal, GridFamily::Trade);
        assert!(academic.to_inches() > trade.to_inches());
    }

    #[test]
    fn test_unknown_family_falls_back_to_academic() {
        assert_eq!(GridFamily::from_key("brutalist"), GridFamily::Academic);
        assert_eq!(GridFamily::from_key("creative"), GridFamily::Creative);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1.0), "1");
        assert_eq!(format_decimal(0.5), "0.5");
        assert_eq!(format_decimal(0.30556), "0.306");
    }
}
