//! Closed enumerations for physical page sizes and margin presets.
//!
//! Request values arrive as camelCase keys (`sixByNine`, `generous`); every
//! other module works with these enums so that adding a size or preset is a
//! single exhaustive change.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported physical page sizes, including the Amazon KDP trim sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    A5,
    SixByNine,
    FiveFiveByEightFive,
    SevenByTen,
    AmazonFiveByEight,
    AmazonSixByNine,
    AmazonSevenByTen,
    AmazonEightByTen,
    AmazonEightFiveByEleven,
}

impl PageSize {
    pub const ALL: [PageSize; 11] = [
        PageSize::Letter,
        PageSize::A4,
        PageSize::A5,
        PageSize::SixByNine,
        PageSize::FiveFiveByEightFive,
        PageSize::SevenByTen,
        PageSize::AmazonFiveByEight,
        PageSize::AmazonSixByNine,
        PageSize::AmazonSevenByTen,
        PageSize::AmazonEightByTen,
        PageSize::AmazonEightFiveByEleven,
    ];

    /// Request key for this size.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Letter => "letter",
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::SixByNine => "sixByNine",
            Self::FiveFiveByEightFive => "fiveFiveByEightFive",
            Self::SevenByTen => "sevenByTen",
            Self::AmazonFiveByEight => "amazonFiveByEight",
            Self::AmazonSixByNine => "amazonSixByNine",
            Self::AmazonSevenByTen => "amazonSevenByTen",
            Self::AmazonEightByTen => "amazonEightByTen",
            Self::AmazonEightFiveByEleven => "amazonEightFiveByEleven",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|size| size.as_str() == key)
    }

    /// Short token used in download filenames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Letter => "letter",
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::SixByNine => "6x9",
            Self::FiveFiveByEightFive => "5.5x8.5",
            Self::SevenByTen => "7x10",
            Self::AmazonFiveByEight => "amazon-5x8",
            Self::AmazonSixByNine => "amazon-6x9",
            Self::AmazonSevenByTen => "amazon-7x10",
            Self::AmazonEightByTen => "amazon-8x10",
            Self::AmazonEightFiveByEleven => "amazon-8.5x11",
        }
    }

    /// Metric sizes get their margins in millimetres, the rest in inches.
    pub fn is_metric(&self) -> bool {
        matches!(self, Self::A4 | Self::A5)
    }

    /// Paper part of the geometry directive, without the margin.
    pub fn paper_directive(&self) -> &'static str {
        match self {
            Self::Letter => "letterpaper",
            Self::A4 => "a4paper",
            Self::A5 => "paperwidth=148mm,paperheight=210mm",
            Self::SixByNine | Self::AmazonSixByNine => "paperwidth=6in,paperheight=9in",
            Self::FiveFiveByEightFive => "paperwidth=5.5in,paperheight=8.5in",
            Self::SevenByTen | Self::AmazonSevenByTen => "paperwidth=7in,paperheight=10in",
            Self::AmazonFiveByEight => "paperwidth=5in,paperheight=8in",
            Self::AmazonEightByTen => "paperwidth=8in,paperheight=10in",
            Self::AmazonEightFiveByEleven => "paperwidth=8.5in,paperheight=11in",
        }
    }
}

/// Named points on the margin generosity scale, ordered from tightest to roomiest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum MarginPreset {
    Minimal,
    Compact,
    Narrow,
    #[default]
    Normal,
    Wide,
    Academic,
    Generous,
}

impl MarginPreset {
    pub const ALL: [MarginPreset; 7] = [
        MarginPreset::Minimal,
        MarginPreset::Compact,
        MarginPreset::Narrow,
        MarginPreset::Normal,
        MarginPreset::Wide,
        MarginPreset::Academic,
        MarginPreset::Generous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Compact => "compact",
            Self::Narrow => "narrow",
            Self::Normal => "normal",
            Self::Wide => "wide",
            Self::Academic => "academic",
            Self::Generous => "generous",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|preset| preset.as_str() == key)
    }

    /// Margin width in baseline grid units.
    pub fn grid_units(&self) -> u32 {
        match self {
            Self::Minimal => 2,
            Self::Compact => 3,
            Self::Narrow => 4,
            Self::Normal => 5,
            Self::Wide => 6,
            Self::Academic => 7,
            Self::Generous => 8,
        }
    }
}
