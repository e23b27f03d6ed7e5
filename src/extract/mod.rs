//! Text-shape extraction: turning a host subtree into positioned, styled lines.

pub mod collector;
pub mod line_prober;
pub mod normalize;
pub mod style_filter;

pub use collector::{collect_shapes, to_shape};
pub use line_prober::{probe_lines, Line};
pub use normalize::normalize;
pub use style_filter::{filter_styles, StyleDeclaration, TRACKED_PROPERTIES};

/// One visually distinct line of rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Exact substring of the run occupying this line
    pub text: String,
    /// Non-default text-rendering properties, in tracked-property order
    pub styles: Vec<StyleDeclaration>,
}
