//! Grid and typography engine.
//!
//! Pure functions from formatting choices to physical layout parameters:
//! - `page` - page sizes and margin presets
//! - `grid` - grid families and the geometry directive
//! - `typography` - heading sizes, leading and spacing steps

pub mod grid;
pub mod page;
pub mod typography;

pub use grid::{derive_geometry, Geometry, GridFamily, Length};
pub use page::{MarginPreset, PageSize};
pub use typography::{derive_typographic_scale, latex_preamble, TypographicScale};
