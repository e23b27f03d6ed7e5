//! Projection of extracted shapes into a self-contained vector document.

pub mod document;
pub mod encoder;
pub mod projector;

pub use document::{StyleClass, TextElement, VectorDocument};
pub use encoder::escape;
pub use projector::{content_extents, project, resolve_fit, Fit, ProjectionOptions};
