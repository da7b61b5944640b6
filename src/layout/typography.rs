//! Typographic scale derived from a grid family's baseline.

use serde::Serialize;
use utoipa::ToSchema;

use super::grid::GridFamily;

const H1_RATIO: f64 = 2.25;
const H2_RATIO: f64 = 1.75;
const H3_RATIO: f64 = 1.375;
const BODY_RATIO: f64 = 1.0;
const SMALL_RATIO: f64 = 0.875;

const SPACING_RATIOS: [f64; 6] = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0];

/// Vertical spacing steps, in whole points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SpacingScale {
    pub xs: u32,
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub xl: u32,
    pub xxl: u32,
}

/// Heading and body sizes in whole points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypographicScale {
    pub base_size: u32,
    pub line_height: f64,
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub body: u32,
    pub small: u32,
    pub spacing: SpacingScale,
}

impl TypographicScale {
    /// Leading for a font size, rounded to a whole point.
    pub fn leading(&self, size: u32) -> u32 {
        (f64::from(size) * self.line_height).round() as u32
    }
}

/// Line-height ratio of a family. Academic text is set looser.
pub fn line_height(family: GridFamily) -> f64 {
    match family {
        GridFamily::Academic => 1.5,
        GridFamily::Editorial | GridFamily::Trade | GridFamily::Corporate | GridFamily::Creative => {
            1.4
        }
    }
}

fn scaled(base: u32, ratio: f64) -> u32 {
    (f64::from(base) * ratio).round() as u32
}

pub fn derive_typographic_scale(family: GridFamily) -> TypographicScale {
    let base = family.baseline_pt();
    let [xs, sm, md, lg, xl, xxl] = SPACING_RATIOS.map(|ratio| scaled(base, ratio));

    TypographicScale {
        base_size: base,
        line_height: line_height(family),
        h1: scaled(base, H1_RATIO),
        h2: scaled(base, H2_RATIO),
        h3: scaled(base, H3_RATIO),
        body: scaled(base, BODY_RATIO),
        small: scaled(base, SMALL_RATIO),
        spacing: SpacingScale {
            xs,
            sm,
            md,
            lg,
            xl,
            xxl,
        },
    }
}

/// Render the scale as LaTeX commands for `--include-in-header`.
///
/// Templates can use `\gridHOne`..`\gridSmall` (including `\gridBody`) for sizes and
/// `\gridSpaceXs`..`\gridSpaceXxl` for vertical rhythm.
pub fn latex_preamble(scale: &TypographicScale) -> String {
    let mut out = String::new();
    out.push_str("% Grid system typography\n");
    out.push_str("\\usepackage{setspace}\n");
    out.push_str(&format!("\\setstretch{{{}}}\n", scale.line_height));

    let sizes = [
        ("gridHOne", scale.h1),
        ("gridHTwo", scale.h2),
        ("gridHThree", scale.h3),
        ("gridBody", scale.body),
        ("gridSmall", scale.small),
    ];
    for (name, size) in sizes {
        out.push_str(&format!(
            "\\providecommand{{\\{name}}}{{\\fontsize{{{size}pt}}{{{}pt}}\\selectfont}}\n",
            scale.leading(size)
        ));
    }

    let spacing = &scale.spacing;
    let steps = [
        ("gridSpaceXs", spacing.xs),
        ("gridSpaceSm", spacing.sm),
        ("gridSpaceMd", spacing.md),
        ("gridSpaceLg", spacing.lg),
        ("gridSpaceXl", spacing.xl),
        ("gridSpaceXxl", spacing.xxl),
    ];
    for (name, points) in steps {
        out.push_str(&format!(
            "\\providecommand{{\\{name}}}{{\\vspace{{{points}pt}}}}\n"
        ));
    }

    out
}
